use crate::domain::model::EnrichedMatchRow;
use serde::{Deserialize, Serialize};

pub const ROUND_OF_16: &str = "RoundOf16";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    #[default]
    Lte,
}

impl Comparison {
    /// 負門檻沒有任何差距能通過
    pub fn holds(self, value: u64, threshold: i64) -> bool {
        let Ok(threshold) = u64::try_from(threshold) else {
            return false;
        };
        match self {
            Comparison::Lt => value < threshold,
            Comparison::Lte => value <= threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }
}

/// Keeps ties whose group-stage points gap is small enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitivenessPolicy {
    pub threshold: i64,
    pub comparison: Comparison,
    pub phase_scoped: bool,
    pub scoped_phase: String,
}

impl CompetitivenessPolicy {
    /// `|pointsDiff| < threshold` on every phase.
    pub fn simple(threshold: i64) -> Self {
        Self {
            threshold,
            comparison: Comparison::Lt,
            phase_scoped: false,
            scoped_phase: ROUND_OF_16.to_string(),
        }
    }

    /// `|pointsDiff| <= threshold` on the round of 16, later rounds always pass.
    pub fn round_of_16(threshold: i64) -> Self {
        Self {
            threshold,
            comparison: Comparison::Lte,
            phase_scoped: true,
            scoped_phase: ROUND_OF_16.to_string(),
        }
    }

    pub fn retains(&self, row: &EnrichedMatchRow) -> bool {
        if self.phase_scoped && row.tie.phase != self.scoped_phase {
            return true;
        }

        // 缺積分無法評估，視為不通過
        match row.points_diff {
            Some(diff) => self.comparison.holds(diff.unsigned_abs(), self.threshold),
            None => false,
        }
    }

    /// 保留符合條件的列，維持原本順序
    pub fn apply(&self, rows: Vec<EnrichedMatchRow>) -> (Vec<EnrichedMatchRow>, usize) {
        let before = rows.len();
        let kept: Vec<EnrichedMatchRow> = rows.into_iter().filter(|row| self.retains(row)).collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    pub fn describe(&self) -> String {
        let rule = format!("|pointsDiff| {} {}", self.comparison.symbol(), self.threshold);
        if self.phase_scoped {
            format!("{} on {} only", rule, self.scoped_phase)
        } else {
            rule
        }
    }
}

impl Default for CompetitivenessPolicy {
    fn default() -> Self {
        Self::round_of_16(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{MatchRow, Side};

    fn row(phase: &str, points_team1: Option<i64>, points_team2: Option<i64>) -> EnrichedMatchRow {
        EnrichedMatchRow {
            tie: MatchRow {
                year: 2010,
                team1: "A".to_string(),
                team2: "B".to_string(),
                full_score: "2–1".to_string(),
                penalties: None,
                away_goals_score: None,
                first_match_score: "1–0".to_string(),
                second_match_score: "1–1".to_string(),
                anomaly: 0,
                phase: phase.to_string(),
                competition: "UCL".to_string(),
            },
            winner: Some(Side::Team1),
            winning_type: None,
            position_team1: Some(1),
            points_team1,
            country_team1: None,
            position_team2: Some(2),
            points_team2,
            country_team2: None,
            played_home_last_game: Side::Team1,
            score_diff_first_match: 1,
            score_diff_second_match: 0,
            score_diff: 1,
            winner_played_last_game_at_home: true,
            points_diff: match (points_team1, points_team2) {
                (Some(p1), Some(p2)) => p1.checked_sub(p2),
                _ => None,
            },
            decided_by_penalty: false,
            decided_by_away_goals_rule: false,
            same_country: false,
        }
    }

    #[test]
    fn test_strict_threshold() {
        let tie = row("Final", Some(10), Some(6));

        assert!(!CompetitivenessPolicy::simple(3).retains(&tie));
        assert!(!CompetitivenessPolicy::simple(4).retains(&tie));
        assert!(CompetitivenessPolicy::simple(5).retains(&tie));
    }

    #[test]
    fn test_inclusive_threshold() {
        let mut policy = CompetitivenessPolicy::round_of_16(4);
        policy.phase_scoped = false;

        assert!(policy.retains(&row("Final", Some(10), Some(6))));
        assert!(policy.retains(&row("Final", Some(6), Some(10))));
        assert!(!policy.retains(&row("Final", Some(11), Some(6))));
    }

    #[test]
    fn test_phase_scoped_filter() {
        let policy = CompetitivenessPolicy::round_of_16(2);

        assert!(!policy.retains(&row(ROUND_OF_16, Some(12), Some(6))));
        assert!(policy.retains(&row(ROUND_OF_16, Some(8), Some(6))));
        assert!(policy.retains(&row("QuarterFinal", Some(12), Some(6))));
    }

    #[test]
    fn test_missing_points_fail_when_evaluated() {
        assert!(!CompetitivenessPolicy::simple(100).retains(&row("Final", None, Some(6))));
        assert!(!CompetitivenessPolicy::round_of_16(100).retains(&row(ROUND_OF_16, Some(3), None)));
        assert!(CompetitivenessPolicy::round_of_16(0).retains(&row("Final", None, None)));
    }

    #[test]
    fn test_raising_threshold_only_adds_rows() {
        let rows: Vec<EnrichedMatchRow> = [(10, 9), (10, 6), (3, 12), (7, 7), (20, 1)]
            .iter()
            .map(|(p1, p2)| row(ROUND_OF_16, Some(*p1), Some(*p2)))
            .collect();

        for comparison in [Comparison::Lt, Comparison::Lte] {
            let mut previous: Vec<usize> = Vec::new();
            for threshold in 0..25 {
                let policy = CompetitivenessPolicy {
                    threshold,
                    comparison,
                    phase_scoped: false,
                    scoped_phase: ROUND_OF_16.to_string(),
                };
                let kept: Vec<usize> = rows
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| policy.retains(r))
                    .map(|(i, _)| i)
                    .collect();
                assert!(previous.iter().all(|i| kept.contains(i)));
                previous = kept;
            }
            assert_eq!(previous.len(), rows.len());
        }
    }

    #[test]
    fn test_apply_keeps_order_and_counts() {
        let policy = CompetitivenessPolicy::simple(3);
        let rows = vec![
            row("Final", Some(10), Some(9)),
            row("Final", Some(10), Some(1)),
            row("Final", Some(4), Some(5)),
        ];

        let (kept, dropped) = policy.apply(rows);

        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].points_diff, Some(1));
        assert_eq!(kept[1].points_diff, Some(-1));
    }

    #[test]
    fn test_describe() {
        assert_eq!(CompetitivenessPolicy::simple(5).describe(), "|pointsDiff| < 5");
        assert_eq!(
            CompetitivenessPolicy::round_of_16(3).describe(),
            "|pointsDiff| <= 3 on RoundOf16 only"
        );
    }

    #[test]
    fn test_extreme_points_gap_never_panics() {
        let mut tie = row("Final", Some(0), Some(0));
        tie.points_diff = Some(i64::MIN);

        assert!(!CompetitivenessPolicy::simple(i64::MAX).retains(&tie));
        assert!(CompetitivenessPolicy::simple(0).apply(vec![tie]).0.is_empty());
        assert!(!CompetitivenessPolicy::simple(3).retains(&row("Final", Some(i64::MAX), Some(-1))));
    }

    #[test]
    fn test_negative_threshold_keeps_nothing_evaluated() {
        let policy = CompetitivenessPolicy::round_of_16(-1);

        assert!(!policy.retains(&row(ROUND_OF_16, Some(5), Some(5))));
        assert!(policy.retains(&row("Final", Some(5), Some(5))));
    }
}
