use crate::domain::model::{MatchRow, StandingsRow};
use crate::utils::error::{PipelineError, Result};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;

pub const MATCH_COLUMNS: [&str; 11] = [
    "Year",
    "Team1",
    "Team2",
    "FullScore",
    "Penaltis",
    "VisitantAdvantage",
    "FirstMatch",
    "SecondMatch",
    "Anomaly",
    "Phase",
    "Competition",
];

pub const STANDINGS_COLUMNS: [&str; 5] = ["Year", "Position", "Club", "Points", "Country"];

/// 與 pandas read_csv 預設相同的缺值標記
const MISSING_SENTINELS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Collapses empty cells and NA sentinels into `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !MISSING_SENTINELS.contains(&v.as_str()))
}

pub fn read_match_table(data: &[u8]) -> Result<Vec<MatchRow>> {
    let rows: Vec<MatchRow> = read_table("match", data, &MATCH_COLUMNS)?;

    Ok(rows
        .into_iter()
        .map(|mut row| {
            row.penalties = normalize_optional(row.penalties);
            row.away_goals_score = normalize_optional(row.away_goals_score);
            row
        })
        .collect())
}

pub fn read_standings_table(data: &[u8]) -> Result<Vec<StandingsRow>> {
    read_table("group", data, &STANDINGS_COLUMNS)
}

fn read_table<T: DeserializeOwned>(table: &str, data: &[u8], required: &[&str]) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::SchemaError {
            table: table.to_string(),
            message: format!("missing required column(s): {}", missing.join(", ")),
        });
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        rows.push(record.map_err(|e| schema_error(table, e))?);
    }

    tracing::debug!("Loaded {} row(s) from {} table", rows.len(), table);
    Ok(rows)
}

/// 型別錯誤轉為 SchemaError，其餘 CSV 錯誤原樣傳遞
fn schema_error(table: &str, error: csv::Error) -> PipelineError {
    let message = match error.kind() {
        csv::ErrorKind::Deserialize { pos, err } => Some(match pos {
            Some(pos) => format!("record on line {}: {}", pos.line(), err),
            None => err.to_string(),
        }),
        _ => None,
    };

    match message {
        Some(message) => PipelineError::SchemaError {
            table: table.to_string(),
            message,
        },
        None => PipelineError::CsvError(error),
    }
}
