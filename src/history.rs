use serde::Serialize;

use crate::chronology::chronological_order;
use crate::data_loader::*;
use crate::ranking::EloTracker;
use crate::ranking_context::RankingContext;
use crate::util::{display_rating, percentage};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub match_index: u32,
    pub matches_won_pct: f64,
    pub games_won_pct: f64,
    pub elo: i64,
}

// Running form of one player after each of their matches. The whole league is replayed,
// because the player's rating depends on how their opponents were rated at the time.
pub fn player_history(player_id: &str, matches: &[Match], ranking_context: &RankingContext) -> Vec<HistoryPoint> {
    let mut tracker = EloTracker::new(ranking_context);
    let mut points = Vec::new();

    let (mut won, mut played) = (0u32, 0u32);
    let (mut games_for, mut games_against) = (0u64, 0u64);

    for m in chronological_order(matches) {
        let update = tracker.process(m);
        if !m.involves(player_id) { continue; }

        let (gf, ga) = m.games_for(player_id);
        played += 1;
        games_for += u64::from(gf);
        games_against += u64::from(ga);
        if m.outcome_for(player_id) == Outcome::Win { won += 1; }

        let rating = if m.player_a == player_id { update.after_a } else { update.after_b };

        points.push(HistoryPoint {
            match_index: played,
            matches_won_pct: percentage(won.into(), played.into()),
            games_won_pct: percentage(games_for, games_for + games_against),
            elo: display_rating(rating),
        });
    }

    points
}
