use crate::core::standings::StandingsLookup;
use crate::core::winner::{parse_score, resolve_winner};
use crate::domain::model::{EnrichedMatchRow, MatchRow, Side, WinningType};
use crate::utils::error::Result;

/// Builds the enriched record of one tie.
///
/// Pure function of the row and the standings: winner resolution, left join of
/// both teams and every derived column. Only malformed scores fail.
pub fn derive_features(row: &MatchRow, standings: &StandingsLookup) -> Result<EnrichedMatchRow> {
    let resolution = resolve_winner(row)?;
    let joined = standings.join(row);

    let position_team1 = joined.team1.map(|s| s.position);
    let position_team2 = joined.team2.map(|s| s.position);
    let points_team1 = joined.team1.map(|s| s.points);
    let points_team2 = joined.team2.map(|s| s.points);
    let country_team1 = joined.team1.map(|s| s.country.clone());
    let country_team2 = joined.team2.map(|s| s.country.clone());

    let played_home_last_game = played_home_last_game(position_team1, position_team2);

    let score_diff_first_match = parse_score(row, "FirstMatch", &row.first_match_score)?.diff();
    let score_diff_second_match = parse_score(row, "SecondMatch", &row.second_match_score)?.diff();

    let winner = resolution.map(|r| r.winner);
    let winning_type = resolution.map(|r| r.winning_type);

    let same_country = matches!(
        (&country_team1, &country_team2),
        (Some(c1), Some(c2)) if c1 == c2
    );

    Ok(EnrichedMatchRow {
        tie: row.clone(),
        winner,
        winning_type,
        position_team1,
        points_team1,
        country_team1,
        position_team2,
        points_team2,
        country_team2,
        played_home_last_game,
        score_diff_first_match,
        score_diff_second_match,
        score_diff: score_diff_first_match + score_diff_second_match,
        winner_played_last_game_at_home: winner == Some(played_home_last_game),
        points_diff: points_diff(points_team1, points_team2),
        decided_by_penalty: winning_type == Some(WinningType::Pena),
        decided_by_away_goals_rule: winning_type == Some(WinningType::Gaat),
        same_country,
    })
}

/// 排名較好 (數字較小) 的一方視為第二回合主場；缺排名時為 Team2
pub fn played_home_last_game(position_team1: Option<i64>, position_team2: Option<i64>) -> Side {
    match (position_team1, position_team2) {
        (Some(p1), Some(p2)) if p1 < p2 => Side::Team1,
        _ => Side::Team2,
    }
}

/// 任一方缺積分或相減溢位時回傳 None，該列在篩選時不通過
pub fn points_diff(points_team1: Option<i64>, points_team2: Option<i64>) -> Option<i64> {
    points_team1?.checked_sub(points_team2?)
}
