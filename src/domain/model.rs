use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 比分分隔符號為 en-dash (U+2013)，不是一般的連字號
pub const SCORE_SEPARATOR: char = '\u{2013}';

/// One two-legged knockout tie as it appears in the match table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchRow {
    pub year: i64,
    pub team1: String,
    pub team2: String,
    pub full_score: String,
    #[serde(rename = "Penaltis", default)]
    pub penalties: Option<String>,
    #[serde(rename = "VisitantAdvantage", default)]
    pub away_goals_score: Option<String>,
    #[serde(rename = "FirstMatch")]
    pub first_match_score: String,
    #[serde(rename = "SecondMatch")]
    pub second_match_score: String,
    pub anomaly: i64,
    pub phase: String,
    pub competition: String,
}

impl MatchRow {
    pub fn is_anomalous(&self) -> bool {
        self.anomaly != 0
    }

    /// 錯誤訊息與日誌使用的簡短描述
    pub fn describe(&self) -> String {
        format!(
            "{} {} vs {} ({})",
            self.year, self.team1, self.team2, self.phase
        )
    }
}

/// Group-stage standing of one club in one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StandingsRow {
    pub year: i64,
    pub position: i64,
    pub club: String,
    pub points: i64,
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn number(self) -> u8 {
        match self {
            Side::Team1 => 1,
            Side::Team2 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WinningType {
    /// 總比分直接分出勝負
    #[serde(rename = "NORM")]
    Norm,
    /// 點球大戰
    #[serde(rename = "PENA")]
    Pena,
    /// 客場進球規則
    #[serde(rename = "GAAT")]
    Gaat,
}

impl WinningType {
    pub fn as_str(self) -> &'static str {
        match self {
            WinningType::Norm => "NORM",
            WinningType::Pena => "PENA",
            WinningType::Gaat => "GAAT",
        }
    }
}

impl fmt::Display for WinningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreParseError {
    #[error("expected 2 scores separated by '–', found {0} token(s)")]
    TokenCount(usize),

    #[error("'{0}' is not a goal count")]
    NotAnInteger(String),
}

/// A "team1–team2" score pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub team1: u32,
    pub team2: u32,
}

impl Score {
    /// The side with more goals, `None` when level.
    pub fn leader(&self) -> Option<Side> {
        match self.team1.cmp(&self.team2) {
            std::cmp::Ordering::Greater => Some(Side::Team1),
            std::cmp::Ordering::Less => Some(Side::Team2),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn diff(&self) -> i64 {
        i64::from(self.team1) - i64::from(self.team2)
    }
}

impl FromStr for Score {
    type Err = ScoreParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = raw.split(SCORE_SEPARATOR).collect();
        if tokens.len() != 2 {
            return Err(ScoreParseError::TokenCount(tokens.len()));
        }

        let goals = |token: &str| {
            let token = token.trim();
            token
                .parse::<u32>()
                .map_err(|_| ScoreParseError::NotAnInteger(token.to_string()))
        };

        Ok(Score {
            team1: goals(tokens[0])?,
            team2: goals(tokens[1])?,
        })
    }
}

/// A match row after winner resolution, standings join and feature derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMatchRow {
    pub tie: MatchRow,
    pub winner: Option<Side>,
    pub winning_type: Option<WinningType>,
    pub position_team1: Option<i64>,
    pub points_team1: Option<i64>,
    pub country_team1: Option<String>,
    pub position_team2: Option<i64>,
    pub points_team2: Option<i64>,
    pub country_team2: Option<String>,
    pub played_home_last_game: Side,
    pub score_diff_first_match: i64,
    pub score_diff_second_match: i64,
    pub score_diff: i64,
    pub winner_played_last_game_at_home: bool,
    pub points_diff: Option<i64>,
    pub decided_by_penalty: bool,
    pub decided_by_away_goals_rule: bool,
    pub same_country: bool,
}

impl EnrichedMatchRow {
    pub fn is_undetermined(&self) -> bool {
        self.winner.is_none()
    }

    pub fn has_join_miss(&self) -> bool {
        self.position_team1.is_none() || self.position_team2.is_none()
    }
}

/// 兩張原始表格
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub matches: Vec<MatchRow>,
    pub standings: Vec<StandingsRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub loaded_matches: usize,
    pub anomalies_excluded: usize,
    pub undetermined_winners: usize,
    pub join_misses: usize,
    pub dropped_undetermined: usize,
    pub filtered_out: usize,
    pub written: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<EnrichedMatchRow>,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_parses_en_dash() {
        let score: Score = "3–1".parse().unwrap();
        assert_eq!(score, Score { team1: 3, team2: 1 });
        assert_eq!(score.leader(), Some(Side::Team1));
        assert_eq!(score.diff(), 2);
    }

    #[test]
    fn test_score_compares_numerically() {
        let score: Score = "9–10".parse().unwrap();
        assert_eq!(score.leader(), Some(Side::Team2));
        assert_eq!(score.diff(), -1);
    }

    #[test]
    fn test_score_tolerates_padding() {
        let score: Score = " 2 – 2 ".parse().unwrap();
        assert_eq!(score.leader(), None);
    }

    #[test]
    fn test_score_rejects_ascii_hyphen() {
        assert_eq!("2-1".parse::<Score>(), Err(ScoreParseError::TokenCount(1)));
    }

    #[test]
    fn test_score_rejects_bad_tokens() {
        assert_eq!(
            "1–2–3".parse::<Score>(),
            Err(ScoreParseError::TokenCount(3))
        );
        assert_eq!(
            "a–2".parse::<Score>(),
            Err(ScoreParseError::NotAnInteger("a".to_string()))
        );
        assert_eq!(
            "–2".parse::<Score>(),
            Err(ScoreParseError::NotAnInteger(String::new()))
        );
    }
}
