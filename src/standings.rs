use std::collections::BTreeMap;

use log::warn;
use serde::Serialize;

use crate::chronology::chronological_order;
use crate::data_loader::*;
use crate::ranking::EloTracker;
use crate::ranking_context::RankingContext;
use crate::util::{display_rating, percentage};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub player_id: PlayerId,
    pub player_name: String,
    pub matches: u32,
    pub matches_won: u32,
    pub matches_drawn: u32,
    pub matches_lost: u32,
    pub matches_won_pct: f64,
    pub games_for: u64,
    pub games_against: u64,
    pub games_won_pct: f64,
    pub elo: i64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    won: u32,
    drawn: u32,
    lost: u32,
    games_for: u64,
    games_against: u64,
}

impl Tally {
    fn record(&mut self, m: &Match, player_id: &str) {
        let (gf, ga) = m.games_for(player_id);
        self.games_for += u64::from(gf);
        self.games_against += u64::from(ga);

        match m.outcome_for(player_id) {
            Outcome::Win => self.won += 1,
            Outcome::Draw => self.drawn += 1,
            Outcome::Loss => self.lost += 1,
        }
    }
}

// One entry per registered player, including players who never played. Counters and
// ratings come out of the same chronological pass. Sorted by matches won, then Elo.
pub fn compute_standings(players: &[Player], matches: &[Match], ranking_context: &RankingContext) -> Vec<Standing> {
    let mut tallies: BTreeMap<&str, Tally> = players.iter()
        .map(|p| (p.id.as_str(), Tally::default()))
        .collect();
    let mut tracker = EloTracker::new(ranking_context);

    for m in chronological_order(matches) {
        tracker.process(m);

        for side in [&m.player_a, &m.player_b] {
            match tallies.get_mut(side.as_str()) {
                Some(tally) => tally.record(m, side),
                None => warn!("Match {} references unregistered player {}", m.id, side),
            }
        }
    }

    let mut standings: Vec<Standing> = players.iter()
        .map(|p| {
            let t = tallies.get(p.id.as_str()).copied().unwrap_or_default();
            let total = t.won + t.drawn + t.lost;
            let rating = tracker.rating(&p.id).unwrap_or(ranking_context.starting_elo);

            Standing {
                player_id: p.id.clone(),
                player_name: p.name.clone(),
                matches: total,
                matches_won: t.won,
                matches_drawn: t.drawn,
                matches_lost: t.lost,
                matches_won_pct: percentage(t.won.into(), total.into()),
                games_for: t.games_for,
                games_against: t.games_against,
                games_won_pct: percentage(t.games_for, t.games_for + t.games_against),
                elo: display_rating(rating),
            }
        })
        .collect();

    standings.sort_by(|a, b| b.matches_won.cmp(&a.matches_won).then(b.elo.cmp(&a.elo)));
    standings
}
