use crate::domain::model::{MatchRow, Score, Side, WinningType};
use crate::utils::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub winner: Side,
    pub winning_type: WinningType,
}

/// 解析比分欄位，失敗時附上欄位與對戰資訊
pub fn parse_score(row: &MatchRow, column: &str, raw: &str) -> Result<Score> {
    raw.parse::<Score>()
        .map_err(|e| PipelineError::MalformedScoreError {
            column: column.to_string(),
            value: raw.to_string(),
            tie: row.describe(),
            reason: e.to_string(),
        })
}

/// Decides who won the tie.
///
/// The aggregate score is checked first. On a level aggregate exactly one
/// tiebreak is consulted: the penalty shootout when present, otherwise the
/// away-goals score. Returns `Ok(None)` when nothing decides the tie.
pub fn resolve_winner(row: &MatchRow) -> Result<Option<Resolution>> {
    let full_score = parse_score(row, "FullScore", &row.full_score)?;
    if let Some(winner) = full_score.leader() {
        return Ok(Some(Resolution {
            winner,
            winning_type: WinningType::Norm,
        }));
    }

    let tiebreak = match (&row.penalties, &row.away_goals_score) {
        (Some(penalties), _) => Some(("Penaltis", penalties, WinningType::Pena)),
        (None, Some(away_goals)) => Some(("VisitantAdvantage", away_goals, WinningType::Gaat)),
        (None, None) => None,
    };

    let Some((column, raw, winning_type)) = tiebreak else {
        return Ok(None);
    };

    let score = parse_score(row, column, raw)?;
    Ok(score.leader().map(|winner| Resolution {
        winner,
        winning_type,
    }))
}
