pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::filter::CompetitivenessPolicy;
#[cfg(feature = "cli")]
use crate::core::writer::OutputProfile;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// 位置參數版本，輸出完整特徵欄位並只在 RoundOf16 套用競爭度門檻
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "home-advantage-etl")]
#[command(about = "Create a CSV file with the home advantage data model")]
pub struct CliConfig {
    /// The path where the raw files are stored
    pub data_path: String,

    /// The name of the original CSV containing match information
    pub match_raw: String,

    /// The name of the original CSV containing group information
    pub group_raw: String,

    /// The name of the CSV file with the model data
    pub data_model: String,

    /// The maximum number of points difference so the match is taken into account
    #[arg(allow_negative_numbers = true)]
    pub competitivity_param: i64,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn data_path(&self) -> &str {
        &self.data_path
    }

    fn match_file(&self) -> &str {
        &self.match_raw
    }

    fn group_file(&self) -> &str {
        &self.group_raw
    }

    fn output_file(&self) -> &str {
        &self.data_model
    }

    fn competitiveness(&self) -> CompetitivenessPolicy {
        CompetitivenessPolicy::round_of_16(self.competitivity_param)
    }

    fn output_profile(&self) -> OutputProfile {
        OutputProfile::Full
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_data_dir("data_path", &self.data_path)?;
        validation::validate_table_file("match_raw", &self.match_raw, "csv")?;
        validation::validate_table_file("group_raw", &self.group_raw, "csv")?;
        validation::validate_table_file("data_model", &self.data_model, "csv")?;
        validation::validate_output_target(
            "data_model",
            &self.data_model,
            &[self.match_raw.as_str(), self.group_raw.as_str()],
        )?;
        validation::validate_threshold("competitivity_param", self.competitivity_param)?;
        Ok(())
    }
}
