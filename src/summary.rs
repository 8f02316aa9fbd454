use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::chronology::{chronological_order, player_matches};
use crate::data_loader::*;
use crate::util::round_to_tenth;

/// Run of identical results ending at a player's latest match, shown as e.g. "W3".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub outcome: Outcome,
    pub length: u32,
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.outcome.code(), self.length)
    }
}

impl Serialize for Streak {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub best_opponent: Option<String>,
    pub worst_opponent: Option<String>,
    pub avg_games_for: f64,
    pub avg_games_against: f64,
    pub current_streak: Option<Streak>,
}

#[derive(Debug, Clone, Copy, Default)]
struct OpponentRecord {
    wins: u32,
    total: u32,
    games_for: u64,
    games_against: u64,
}

impl OpponentRecord {
    fn win_pct(&self) -> f64 {
        self.wins as f64 / self.total as f64
    }

    fn game_pct(&self) -> f64 {
        let games = self.games_for + self.games_against;
        if games == 0 { return 0.5; }
        self.games_for as f64 / games as f64
    }
}

pub fn current_streak(own_matches: &[&Match], player_id: &str) -> Option<Streak> {
    let mut outcomes = own_matches.iter().rev().map(|m| m.outcome_for(player_id));
    let outcome = outcomes.next()?;
    let length = 1 + outcomes.take_while(|o| *o == outcome).count() as u32;

    Some(Streak { outcome, length })
}

// Per-player tooltip data. Players without matches still get an entry, with
// no opponents, zero averages and no streak.
pub fn compute_summaries(players: &[Player], matches: &[Match]) -> BTreeMap<PlayerId, PlayerSummary> {
    let names: BTreeMap<&str, &str> = players.iter().map(|p| (p.id.as_str(), p.name.as_str())).collect();
    let name_of = |id: &str| names.get(id).map_or_else(|| id.to_string(), |n| n.to_string());

    let ordered = chronological_order(matches);
    let mut summaries = BTreeMap::new();

    for p in players {
        let own = player_matches(&ordered, &p.id);

        let mut opponents: BTreeMap<&str, OpponentRecord> = BTreeMap::new();
        let (mut total_for, mut total_against) = (0u64, 0u64);
        for m in &own {
            let (gf, ga) = m.games_for(&p.id);
            total_for += u64::from(gf);
            total_against += u64::from(ga);

            let record = opponents.entry(m.other_player(&p.id).as_str()).or_default();
            record.total += 1;
            record.games_for += u64::from(gf);
            record.games_against += u64::from(ga);
            if m.outcome_for(&p.id) == Outcome::Win { record.wins += 1; }
        }

        let mut ranked: Vec<(&str, OpponentRecord)> = opponents.into_iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.win_pct().partial_cmp(&a.win_pct()).unwrap_or(Ordering::Equal)
                .then(b.game_pct().partial_cmp(&a.game_pct()).unwrap_or(Ordering::Equal))
        });

        let best_opponent = ranked.first().map(|(id, _)| name_of(id));
        let worst_opponent = if ranked.len() > 1 { ranked.last().map(|(id, _)| name_of(id)) } else { None };

        let played = own.len() as f64;
        let (avg_games_for, avg_games_against) = if own.is_empty() {
            (0.0, 0.0)
        } else {
            (round_to_tenth(total_for as f64 / played), round_to_tenth(total_against as f64 / played))
        };

        summaries.insert(p.id.clone(), PlayerSummary {
            best_opponent,
            worst_opponent,
            avg_games_for,
            avg_games_against,
            current_streak: current_streak(&own, &p.id),
        });
    }

    summaries
}
