use crate::core::filter::{Comparison, CompetitivenessPolicy, ROUND_OF_16};
use crate::core::standings::DuplicateStandingsPolicy;
use crate::core::writer::{OutputFormat, OutputProfile};
use crate::core::ConfigProvider;
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_THRESHOLD: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub join: JoinConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub data_path: String,
    pub match_file: String,
    pub group_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinConfig {
    pub on_duplicate_standings: Option<DuplicateStandingsPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub threshold: Option<i64>,
    pub comparison: Option<Comparison>,
    pub phase_scoped: Option<bool>,
    pub scoped_phase: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_file: String,
    pub profile: Option<OutputProfile>,
    pub output_formats: Option<Vec<OutputFormat>>,
    pub drop_undetermined: Option<bool>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub system_stats: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PipelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PipelineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_PATH})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PipelineError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_label("pipeline.name", &self.pipeline.name)?;
        validation::validate_data_dir("source.data_path", &self.source.data_path)?;
        validation::validate_table_file("source.match_file", &self.source.match_file, "csv")?;
        validation::validate_table_file("source.group_file", &self.source.group_file, "csv")?;
        validation::validate_table_file("load.output_file", &self.load.output_file, "csv")?;

        let inputs = [self.source.match_file.as_str(), self.source.group_file.as_str()];
        validation::validate_output_target("load.output_file", &self.load.output_file, &inputs)?;

        let policy = self.competitiveness();
        validation::validate_threshold("filter.threshold", policy.threshold)?;
        if policy.phase_scoped {
            validation::validate_label("filter.scoped_phase", &policy.scoped_phase)?;
        }

        if let Some(formats) = &self.load.output_formats {
            if formats.is_empty() {
                return Err(PipelineError::InvalidConfigValueError {
                    field: "load.output_formats".to_string(),
                    value: "[]".to_string(),
                    reason: "At least one output format is required".to_string(),
                });
            }
        }

        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            let filename = validation::require("load.compression.filename", &compression.filename)?;
            validation::validate_table_file("load.compression.filename", filename, "zip")?;
            validation::validate_output_target("load.compression.filename", filename, &inputs)?;
        }

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            let valid_formats = ["compact", "json"];
            if !valid_formats.contains(&format) {
                return Err(PipelineError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    /// 命令列覆蓋門檻
    pub fn override_threshold(&mut self, threshold: i64) {
        self.filter.threshold = Some(threshold);
    }

    /// 取得監控設定
    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// `[monitoring]` 啟用且未關閉 system_stats
    pub fn system_stats_enabled(&self) -> bool {
        self.monitoring_enabled()
            && self
                .monitoring
                .as_ref()
                .and_then(|m| m.system_stats)
                .unwrap_or(true)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn data_path(&self) -> &str {
        &self.source.data_path
    }

    fn match_file(&self) -> &str {
        &self.source.match_file
    }

    fn group_file(&self) -> &str {
        &self.source.group_file
    }

    fn output_file(&self) -> &str {
        &self.load.output_file
    }

    fn competitiveness(&self) -> CompetitivenessPolicy {
        CompetitivenessPolicy {
            threshold: self.filter.threshold.unwrap_or(DEFAULT_THRESHOLD),
            comparison: self.filter.comparison.unwrap_or_default(),
            phase_scoped: self.filter.phase_scoped.unwrap_or(true),
            scoped_phase: self
                .filter
                .scoped_phase
                .clone()
                .unwrap_or_else(|| ROUND_OF_16.to_string()),
        }
    }

    fn output_profile(&self) -> OutputProfile {
        self.load.profile.unwrap_or_default()
    }

    fn duplicate_policy(&self) -> DuplicateStandingsPolicy {
        self.join.on_duplicate_standings.unwrap_or_default()
    }

    fn drop_undetermined(&self) -> bool {
        self.load.drop_undetermined.unwrap_or(false)
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.load
            .output_formats
            .clone()
            .unwrap_or_else(|| vec![OutputFormat::Csv])
    }

    fn bundle_filename(&self) -> Option<String> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .and_then(|c| c.filename.clone())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
