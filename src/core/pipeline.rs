use crate::core::features::derive_features;
use crate::core::filter::CompetitivenessPolicy;
use crate::core::loader;
use crate::core::standings::{DuplicateStandingsPolicy, StandingsLookup};
use crate::core::writer;
use crate::core::{ConfigProvider, Pipeline, SourceTables, Storage, TransformResult};
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use std::path::Path;

/// Transform settings shared by every configuration surface.
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub competitiveness: CompetitivenessPolicy,
    pub duplicate_policy: DuplicateStandingsPolicy,
    pub drop_undetermined: bool,
}

impl ModelOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            competitiveness: config.competitiveness(),
            duplicate_policy: config.duplicate_policy(),
            drop_undetermined: config.drop_undetermined(),
        }
    }
}

/// Runs resolver, joiner, deriver and filter over the loaded tables.
///
/// Row order follows the match table. Anomalous rows are removed before any
/// score is parsed.
pub fn build_data_model(tables: SourceTables, options: &ModelOptions) -> Result<TransformResult> {
    let mut summary = RunSummary {
        loaded_matches: tables.matches.len(),
        ..RunSummary::default()
    };

    let standings = StandingsLookup::build(tables.standings, options.duplicate_policy)?;
    tracing::debug!("Indexed {} standings entries", standings.len());

    let mut enriched = Vec::with_capacity(tables.matches.len());
    for row in &tables.matches {
        if row.is_anomalous() {
            summary.anomalies_excluded += 1;
            tracing::debug!("Skipping anomalous tie {}", row.describe());
            continue;
        }

        let record = derive_features(row, &standings)?;

        if record.has_join_miss() {
            summary.join_misses += 1;
            tracing::warn!("⚠️ No standings for one side of {}", row.describe());
        }

        if record.is_undetermined() {
            summary.undetermined_winners += 1;
            tracing::warn!("⚠️ Winner of {} could not be determined", row.describe());
            if options.drop_undetermined {
                summary.dropped_undetermined += 1;
                continue;
            }
        }

        enriched.push(record);
    }

    let (records, filtered_out) = options.competitiveness.apply(enriched);
    summary.filtered_out = filtered_out;
    summary.written = records.len();

    tracing::debug!(
        "Competitiveness filter ({}) removed {} tie(s)",
        options.competitiveness.describe(),
        filtered_out
    );

    Ok(TransformResult { records, summary })
}

pub struct DataModelPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DataModelPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn full_path(&self, file: &str) -> String {
        Path::new(self.config.data_path())
            .join(file)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DataModelPipeline<S, C> {
    async fn extract(&self) -> Result<SourceTables> {
        tracing::debug!("Reading match table: {}", self.config.match_file());
        let match_data = self.storage.read_file(self.config.match_file()).await?;
        let matches = loader::read_match_table(&match_data)?;

        tracing::debug!("Reading group table: {}", self.config.group_file());
        let group_data = self.storage.read_file(self.config.group_file()).await?;
        let standings = loader::read_standings_table(&group_data)?;

        Ok(SourceTables { matches, standings })
    }

    async fn transform(&self, tables: SourceTables) -> Result<TransformResult> {
        build_data_model(tables, &ModelOptions::from_config(&self.config))
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let profile = self.config.output_profile();
        let outputs = writer::render_outputs(
            profile,
            &self.config.output_formats(),
            self.config.output_file(),
            &result.records,
        )?;

        // 全部渲染完成後才寫檔，任何錯誤都不會留下半成品
        match self.config.bundle_filename() {
            Some(bundle_name) => {
                // 產生時間只寫入日誌，相同輸入的 bundle 必須逐位元組相同
                tracing::info!(
                    "🕒 Bundle {} generated at {}",
                    bundle_name,
                    chrono::Utc::now().to_rfc3339()
                );
                let manifest = serde_json::json!({
                    "profile": profile,
                    "competitiveness": self.config.competitiveness().describe(),
                    "files": outputs.iter().map(|o| o.filename.clone()).collect::<Vec<_>>(),
                    "summary": result.summary,
                });
                let zip_data = writer::bundle(&outputs, &manifest)?;

                tracing::debug!("Writing ZIP bundle ({} bytes) to storage", zip_data.len());
                self.storage.write_file(&bundle_name, &zip_data).await?;
                Ok(self.full_path(&bundle_name))
            }
            None => {
                for output in &outputs {
                    tracing::debug!("Writing {} ({} bytes)", output.filename, output.data.len());
                    self.storage.write_file(&output.filename, &output.data).await?;
                }
                Ok(self.full_path(self.config.output_file()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::writer::{OutputFormat, OutputProfile};
    use crate::domain::model::{MatchRow, StandingsRow};
    use crate::utils::error::PipelineError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const MATCHES: &str = "Year,Team1,Team2,FullScore,Penaltis,VisitantAdvantage,FirstMatch,SecondMatch,Anomaly,Phase,Competition
2010,A,B,3–3,5–4,,1–2,2–1,0,Final,UCL
2010,C,D,2–1,,,1–0,1–1,0,RoundOf16,UCL
2010,E,F,bad,,,x,y,1,RoundOf16,UCL
";

    const GROUPS: &str = "Year,Position,Club,Points,Country
2010,1,A,10,X
2010,5,B,6,Y
2010,1,C,15,X
2010,2,D,9,X
";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn with_file(self, path: &str, data: &str) -> Self {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.as_bytes().to_vec());
            self
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                PipelineError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        policy: CompetitivenessPolicy,
        profile: OutputProfile,
        formats: Vec<OutputFormat>,
        bundle: Option<String>,
    }

    impl MockConfig {
        fn new(policy: CompetitivenessPolicy) -> Self {
            Self {
                policy,
                profile: OutputProfile::Full,
                formats: vec![OutputFormat::Csv],
                bundle: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn data_path(&self) -> &str {
            "data"
        }

        fn match_file(&self) -> &str {
            "match.csv"
        }

        fn group_file(&self) -> &str {
            "group.csv"
        }

        fn output_file(&self) -> &str {
            "model.csv"
        }

        fn competitiveness(&self) -> CompetitivenessPolicy {
            self.policy.clone()
        }

        fn output_profile(&self) -> OutputProfile {
            self.profile
        }

        fn output_formats(&self) -> Vec<OutputFormat> {
            self.formats.clone()
        }

        fn bundle_filename(&self) -> Option<String> {
            self.bundle.clone()
        }
    }

    async fn seeded_storage() -> MockStorage {
        MockStorage::new()
            .with_file("match.csv", MATCHES)
            .await
            .with_file("group.csv", GROUPS)
            .await
    }

    #[tokio::test]
    async fn test_extract_reads_both_tables() {
        let pipeline = DataModelPipeline::new(
            seeded_storage().await,
            MockConfig::new(CompetitivenessPolicy::simple(5)),
        );

        let tables = pipeline.extract().await.unwrap();

        assert_eq!(tables.matches.len(), 3);
        assert_eq!(tables.standings.len(), 4);
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let pipeline = DataModelPipeline::new(
            MockStorage::new().with_file("match.csv", MATCHES).await,
            MockConfig::new(CompetitivenessPolicy::simple(5)),
        );

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, PipelineError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_excludes_anomalies_and_filters() {
        let pipeline = DataModelPipeline::new(
            seeded_storage().await,
            MockConfig::new(CompetitivenessPolicy::simple(5)),
        );

        let tables = pipeline.extract().await.unwrap();
        let result = pipeline.transform(tables).await.unwrap();

        // A-B differ by 4 points, C-D by 6
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].tie.team1, "A");
        assert_eq!(result.summary.loaded_matches, 3);
        assert_eq!(result.summary.anomalies_excluded, 1);
        assert_eq!(result.summary.filtered_out, 1);
        assert_eq!(result.summary.written, 1);
    }

    #[tokio::test]
    async fn test_transform_threshold_examples() {
        let tables = SourceTables {
            matches: vec![MatchRow {
                year: 2010,
                team1: "A".to_string(),
                team2: "B".to_string(),
                full_score: "3–3".to_string(),
                penalties: Some("5–4".to_string()),
                away_goals_score: None,
                first_match_score: "1–2".to_string(),
                second_match_score: "2–1".to_string(),
                anomaly: 0,
                phase: "Final".to_string(),
                competition: "UCL".to_string(),
            }],
            standings: vec![
                StandingsRow {
                    year: 2010,
                    position: 1,
                    club: "A".to_string(),
                    points: 10,
                    country: "X".to_string(),
                },
                StandingsRow {
                    year: 2010,
                    position: 5,
                    club: "B".to_string(),
                    points: 6,
                    country: "Y".to_string(),
                },
            ],
        };

        let dropped = build_data_model(
            tables.clone(),
            &ModelOptions {
                competitiveness: CompetitivenessPolicy::simple(3),
                ..ModelOptions::default()
            },
        )
        .unwrap();
        assert!(dropped.records.is_empty());

        let retained = build_data_model(
            tables,
            &ModelOptions {
                competitiveness: CompetitivenessPolicy::simple(5),
                ..ModelOptions::default()
            },
        )
        .unwrap();
        assert_eq!(retained.records.len(), 1);
    }

    #[tokio::test]
    async fn test_transform_drop_undetermined() {
        let matches = "Year,Team1,Team2,FullScore,Penaltis,VisitantAdvantage,FirstMatch,SecondMatch,Anomaly,Phase,Competition
2010,A,B,1–1,,,1–0,0–1,0,Final,UCL
";
        let tables = SourceTables {
            matches: loader::read_match_table(matches.as_bytes()).unwrap(),
            standings: loader::read_standings_table(GROUPS.as_bytes()).unwrap(),
        };

        let kept = build_data_model(
            tables.clone(),
            &ModelOptions {
                competitiveness: CompetitivenessPolicy::simple(10),
                ..ModelOptions::default()
            },
        )
        .unwrap();
        assert_eq!(kept.records.len(), 1);
        assert_eq!(kept.summary.undetermined_winners, 1);

        let dropped = build_data_model(
            tables,
            &ModelOptions {
                competitiveness: CompetitivenessPolicy::simple(10),
                drop_undetermined: true,
                ..ModelOptions::default()
            },
        )
        .unwrap();
        assert!(dropped.records.is_empty());
        assert_eq!(dropped.summary.dropped_undetermined, 1);
    }

    #[test]
    fn test_extreme_points_do_not_abort_the_build() {
        let groups = "Year,Position,Club,Points,Country
2010,1,A,9223372036854775807,X
2010,5,B,-1,Y
";
        let matches = "Year,Team1,Team2,FullScore,Penaltis,VisitantAdvantage,FirstMatch,SecondMatch,Anomaly,Phase,Competition
2010,A,B,3–3,5–4,,1–2,2–1,0,Final,UCL
";
        let tables = SourceTables {
            matches: loader::read_match_table(matches.as_bytes()).unwrap(),
            standings: loader::read_standings_table(groups.as_bytes()).unwrap(),
        };

        let strict = build_data_model(
            tables.clone(),
            &ModelOptions {
                competitiveness: CompetitivenessPolicy::simple(i64::MAX),
                ..ModelOptions::default()
            },
        )
        .unwrap();
        assert!(strict.records.is_empty());
        assert_eq!(strict.summary.filtered_out, 1);

        // Later rounds are outside the scoped filter and keep an empty points gap
        let scoped = build_data_model(tables, &ModelOptions::default()).unwrap();
        assert_eq!(scoped.records.len(), 1);
        assert_eq!(scoped.records[0].points_diff, None);
    }

    #[tokio::test]
    async fn test_load_writes_csv() {
        let storage = seeded_storage().await;
        let pipeline = DataModelPipeline::new(
            storage.clone(),
            MockConfig::new(CompetitivenessPolicy::simple(5)),
        );

        let tables = pipeline.extract().await.unwrap();
        let result = pipeline.transform(tables).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, Path::new("data").join("model.csv").to_string_lossy());

        let csv = String::from_utf8(storage.get_file("model.csv").await.unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2010,A,B,1,True,False,-1,1,0,PENA,True,False,Final,UCL"
        );
    }

    #[tokio::test]
    async fn test_load_with_bundle() {
        let storage = seeded_storage().await;
        let mut config = MockConfig::new(CompetitivenessPolicy::round_of_16(3));
        config.formats = vec![OutputFormat::Csv, OutputFormat::Tsv];
        config.bundle = Some("model.zip".to_string());
        let pipeline = DataModelPipeline::new(storage.clone(), config);

        let tables = pipeline.extract().await.unwrap();
        let result = pipeline.transform(tables).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert!(output_path.ends_with("model.zip"));
        assert!(storage.get_file("model.csv").await.is_none());

        let zip_data = storage.get_file("model.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["model.csv", "model.tsv", "summary.json"]);

        let summary: serde_json::Value = {
            let file = archive.by_name("summary.json").unwrap();
            serde_json::from_reader(file).unwrap()
        };
        // C-D is RoundOf16 with a 6 point gap, A-B is a Final and passes
        assert_eq!(summary["summary"]["written"], serde_json::json!(1));
        assert_eq!(summary["summary"]["anomalies_excluded"], serde_json::json!(1));
    }

    #[tokio::test]
    async fn test_malformed_score_writes_nothing() {
        let matches = "Year,Team1,Team2,FullScore,Penaltis,VisitantAdvantage,FirstMatch,SecondMatch,Anomaly,Phase,Competition
2010,A,B,2–1,,,1-0,1–1,0,Final,UCL
";
        let storage = MockStorage::new()
            .with_file("match.csv", matches)
            .await
            .with_file("group.csv", GROUPS)
            .await;
        let pipeline = DataModelPipeline::new(
            storage.clone(),
            MockConfig::new(CompetitivenessPolicy::simple(5)),
        );

        let tables = pipeline.extract().await.unwrap();
        let err = pipeline.transform(tables).await.unwrap_err();

        assert!(matches!(err, PipelineError::MalformedScoreError { .. }));
        assert!(storage.get_file("model.csv").await.is_none());
    }
}
