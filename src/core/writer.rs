use crate::domain::model::EnrichedMatchRow;
use crate::utils::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Column set written for each retained tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputProfile {
    /// Derived features only, one analysis-ready row per tie.
    #[default]
    Full,
    /// Every input and joined column plus `HomeAdvantageWasValidated`.
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Year,
    Team1,
    Team2,
    FullScore,
    Penaltis,
    VisitantAdvantage,
    FirstMatch,
    SecondMatch,
    Anomaly,
    Phase,
    Competition,
    Winner,
    WinningType,
    PositionTeam1,
    PointsTeam1,
    CountryTeam1,
    PositionTeam2,
    PointsTeam2,
    CountryTeam2,
    PlayedHomeLastGame,
    HomeAdvantageWasValidated,
    WinnerPlayedLastGameAtHome,
    SameCountry,
    ScoreDiffFirstMatch,
    ScoreDiffSecondMatch,
    ScoreDiff,
    DecidedPenalty,
    DecidedGoalAwayRule,
}

const FULL_COLUMNS: &[Column] = &[
    Column::Year,
    Column::Team1,
    Column::Team2,
    Column::Winner,
    Column::WinnerPlayedLastGameAtHome,
    Column::SameCountry,
    Column::ScoreDiffFirstMatch,
    Column::ScoreDiffSecondMatch,
    Column::ScoreDiff,
    Column::WinningType,
    Column::DecidedPenalty,
    Column::DecidedGoalAwayRule,
    Column::Phase,
    Column::Competition,
];

const SIMPLE_COLUMNS: &[Column] = &[
    Column::Year,
    Column::Team1,
    Column::Team2,
    Column::FullScore,
    Column::Penaltis,
    Column::VisitantAdvantage,
    Column::FirstMatch,
    Column::SecondMatch,
    Column::Anomaly,
    Column::Phase,
    Column::Competition,
    Column::Winner,
    Column::WinningType,
    Column::PositionTeam1,
    Column::PointsTeam1,
    Column::CountryTeam1,
    Column::PositionTeam2,
    Column::PointsTeam2,
    Column::CountryTeam2,
    Column::PlayedHomeLastGame,
    Column::HomeAdvantageWasValidated,
];

impl OutputProfile {
    pub fn columns(self) -> &'static [Column] {
        match self {
            OutputProfile::Full => FULL_COLUMNS,
            OutputProfile::Simple => SIMPLE_COLUMNS,
        }
    }

    pub fn header(self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name()).collect()
    }
}

/// 單一儲存格的值
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Int(Option<i64>),
    Text(Option<&'a str>),
    Bool(bool),
}

impl Cell<'_> {
    /// 缺值輸出為空字串，布林值沿用 pandas 的 True/False
    pub fn render(&self) -> String {
        match self {
            Cell::Int(Some(value)) => value.to_string(),
            Cell::Text(Some(value)) => value.to_string(),
            Cell::Int(None) | Cell::Text(None) => String::new(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Int(Some(value)) => serde_json::Value::from(*value),
            Cell::Text(Some(value)) => serde_json::Value::from(*value),
            Cell::Int(None) | Cell::Text(None) => serde_json::Value::Null,
            Cell::Bool(value) => serde_json::Value::Bool(*value),
        }
    }
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Year => "Year",
            Column::Team1 => "Team1",
            Column::Team2 => "Team2",
            Column::FullScore => "FullScore",
            Column::Penaltis => "Penaltis",
            Column::VisitantAdvantage => "VisitantAdvantage",
            Column::FirstMatch => "FirstMatch",
            Column::SecondMatch => "SecondMatch",
            Column::Anomaly => "Anomaly",
            Column::Phase => "Phase",
            Column::Competition => "Competition",
            Column::Winner => "Winner",
            Column::WinningType => "WinningType",
            Column::PositionTeam1 => "PositionTeam1",
            Column::PointsTeam1 => "PointsTeam1",
            Column::CountryTeam1 => "CountryTeam1",
            Column::PositionTeam2 => "PositionTeam2",
            Column::PointsTeam2 => "PointsTeam2",
            Column::CountryTeam2 => "CountryTeam2",
            Column::PlayedHomeLastGame => "PlayedHomeLastGame",
            Column::HomeAdvantageWasValidated => "HomeAdvantageWasValidated",
            Column::WinnerPlayedLastGameAtHome => "WinnerPlayedLastGameAtHome",
            Column::SameCountry => "SameCountry",
            Column::ScoreDiffFirstMatch => "ScoreDiffFirstMatch",
            Column::ScoreDiffSecondMatch => "ScoreDiffSecondMatch",
            Column::ScoreDiff => "ScoreDiff",
            Column::DecidedPenalty => "DecidedPenalty",
            Column::DecidedGoalAwayRule => "DecidedGoalAwayRule",
        }
    }

    pub fn cell(self, row: &EnrichedMatchRow) -> Cell<'_> {
        let tie = &row.tie;
        match self {
            Column::Year => Cell::Int(Some(tie.year)),
            Column::Team1 => Cell::Text(Some(tie.team1.as_str())),
            Column::Team2 => Cell::Text(Some(tie.team2.as_str())),
            Column::FullScore => Cell::Text(Some(tie.full_score.as_str())),
            Column::Penaltis => Cell::Text(tie.penalties.as_deref()),
            Column::VisitantAdvantage => Cell::Text(tie.away_goals_score.as_deref()),
            Column::FirstMatch => Cell::Text(Some(tie.first_match_score.as_str())),
            Column::SecondMatch => Cell::Text(Some(tie.second_match_score.as_str())),
            Column::Anomaly => Cell::Int(Some(tie.anomaly)),
            Column::Phase => Cell::Text(Some(tie.phase.as_str())),
            Column::Competition => Cell::Text(Some(tie.competition.as_str())),
            Column::Winner => Cell::Int(row.winner.map(|w| i64::from(w.number()))),
            Column::WinningType => Cell::Text(row.winning_type.map(|t| t.as_str())),
            Column::PositionTeam1 => Cell::Int(row.position_team1),
            Column::PointsTeam1 => Cell::Int(row.points_team1),
            Column::CountryTeam1 => Cell::Text(row.country_team1.as_deref()),
            Column::PositionTeam2 => Cell::Int(row.position_team2),
            Column::PointsTeam2 => Cell::Int(row.points_team2),
            Column::CountryTeam2 => Cell::Text(row.country_team2.as_deref()),
            Column::PlayedHomeLastGame => {
                Cell::Int(Some(i64::from(row.played_home_last_game.number())))
            }
            Column::HomeAdvantageWasValidated | Column::WinnerPlayedLastGameAtHome => {
                Cell::Bool(row.winner_played_last_game_at_home)
            }
            Column::SameCountry => Cell::Bool(row.same_country),
            Column::ScoreDiffFirstMatch => Cell::Int(Some(row.score_diff_first_match)),
            Column::ScoreDiffSecondMatch => Cell::Int(Some(row.score_diff_second_match)),
            Column::ScoreDiff => Cell::Int(Some(row.score_diff)),
            Column::DecidedPenalty => Cell::Bool(row.decided_by_penalty),
            Column::DecidedGoalAwayRule => Cell::Bool(row.decided_by_away_goals_rule),
        }
    }
}

/// One rendered file, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub filename: String,
    pub data: Vec<u8>,
}

pub fn render_delimited(
    profile: OutputProfile,
    rows: &[EnrichedMatchRow],
    delimiter: u8,
) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(profile.header())?;
    for row in rows {
        writer.write_record(profile.columns().iter().map(|c| c.cell(row).render()))?;
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::IoError(e.into_error()))
}

pub fn render_json(profile: OutputProfile, rows: &[EnrichedMatchRow]) -> Result<Vec<u8>> {
    let records: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = profile
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.cell(row).to_json()))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();

    Ok(serde_json::to_vec_pretty(&records)?)
}

/// Renders the model file plus any extra formats.
///
/// The CSV is always produced under `output_file`; TSV and JSON reuse its stem.
pub fn render_outputs(
    profile: OutputProfile,
    formats: &[OutputFormat],
    output_file: &str,
    rows: &[EnrichedMatchRow],
) -> Result<Vec<RenderedOutput>> {
    let mut outputs = vec![RenderedOutput {
        filename: output_file.to_string(),
        data: render_delimited(profile, rows, b',')?,
    }];

    for format in formats {
        let data = match format {
            OutputFormat::Csv => continue,
            OutputFormat::Tsv => render_delimited(profile, rows, b'\t')?,
            OutputFormat::Json => render_json(profile, rows)?,
        };
        let filename = Path::new(output_file)
            .with_extension(format.extension())
            .to_string_lossy()
            .into_owned();
        if outputs.iter().any(|o| o.filename == filename) {
            continue;
        }
        outputs.push(RenderedOutput { filename, data });
    }

    Ok(outputs)
}

/// 固定時間戳，相同內容的 bundle 逐位元組相同
fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().last_modified_time(zip::DateTime::default())
}

/// 將所有輸出與 summary.json 打包成單一 zip
pub fn bundle(outputs: &[RenderedOutput], manifest: &serde_json::Value) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for output in outputs {
        let name = Path::new(&output.filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| output.filename.clone());
        zip.start_file(name, entry_options())?;
        zip.write_all(&output.data)?;
    }

    zip.start_file("summary.json", entry_options())?;
    zip.write_all(serde_json::to_string_pretty(manifest)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
