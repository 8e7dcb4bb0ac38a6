use crate::domain::model::{MatchRow, StandingsRow};
use crate::utils::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// 同一 (Year, Club) 出現多筆時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStandingsPolicy {
    #[default]
    Reject,
    KeepFirst,
}

/// Standings of both teams of a tie; `None` marks a join miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedStandings<'a> {
    pub team1: Option<&'a StandingsRow>,
    pub team2: Option<&'a StandingsRow>,
}

/// Standings indexed by (year, club).
#[derive(Debug, Clone, Default)]
pub struct StandingsLookup {
    by_year: HashMap<i64, HashMap<String, StandingsRow>>,
    len: usize,
}

impl StandingsLookup {
    pub fn build(rows: Vec<StandingsRow>, policy: DuplicateStandingsPolicy) -> Result<Self> {
        let mut lookup = Self::default();

        for row in rows {
            let clubs = lookup.by_year.entry(row.year).or_default();
            match clubs.entry(row.club.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(row);
                    lookup.len += 1;
                }
                Entry::Occupied(_) => match policy {
                    DuplicateStandingsPolicy::Reject => {
                        return Err(PipelineError::DuplicateStandingsKeyError {
                            year: row.year,
                            club: row.club,
                        });
                    }
                    DuplicateStandingsPolicy::KeepFirst => {
                        tracing::warn!(
                            "⚠️ Duplicate standings for {} in {}, keeping the first row",
                            row.club,
                            row.year
                        );
                    }
                },
            }
        }

        Ok(lookup)
    }

    pub fn get(&self, year: i64, club: &str) -> Option<&StandingsRow> {
        self.by_year.get(&year)?.get(club)
    }

    /// Left join of both teams of `row` against the standings.
    pub fn join(&self, row: &MatchRow) -> JoinedStandings<'_> {
        JoinedStandings {
            team1: self.get(row.year, &row.team1),
            team2: self.get(row.year, &row.team2),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
