use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::chronology::chronological_order;
use crate::data_loader::*;
use crate::ranking_context::RankingContext;
use crate::util::display_rating;

// Replays every match in chronological order. Ratings are created lazily: a player gets the
// starting rating the first time they show up, so players who never played have no entry.
pub fn compute_elo(players: &[Player], matches: &[Match], ranking_context: &RankingContext) -> EloReplay {
    let ordered = chronological_order(matches);
    debug!("Replaying {} matches for {} registered players", ordered.len(), players.len());

    let mut tracker = EloTracker::new(ranking_context);
    let mut per_match_delta = BTreeMap::new();
    let mut per_player_history: BTreeMap<PlayerId, Vec<f64>> = BTreeMap::new();

    for m in ordered {
        let update = tracker.process(m);

        per_player_history.entry(m.player_a.clone()).or_default().push(update.after_a);
        per_player_history.entry(m.player_b.clone()).or_default().push(update.after_b);
        per_match_delta.insert(m.id.clone(), update.to_delta(&m.id));
    }

    EloReplay {
        final_ratings: tracker.into_ratings(),
        per_match_delta,
        per_player_history,
    }
}

pub fn expected_score(rating: f64, opponent_rating: f64, ranking_context: &RankingContext) -> f64 {
    1.0 / (1.0 + f64::powf(10.0, (opponent_rating - rating) / ranking_context.elo_delta))
}

pub fn elo_result(actual_score: f64, expected_score: f64, ranking_context: &RankingContext) -> f64 {
    ranking_context.elo_k * (actual_score - expected_score)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EloDelta {
    pub match_id: MatchId,
    pub elo_a_before: i64,
    pub elo_b_before: i64,
    pub delta_a: i64,
    pub delta_b: i64,
    pub expected_a: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EloReplay {
    pub final_ratings: BTreeMap<PlayerId, f64>,
    pub per_match_delta: BTreeMap<MatchId, EloDelta>,
    pub per_player_history: BTreeMap<PlayerId, Vec<f64>>,
}

impl EloReplay {
    pub fn rating(&self, player_id: &str) -> Option<f64> {
        self.final_ratings.get(player_id).copied()
    }

    pub fn display_rating(&self, player_id: &str) -> Option<i64> {
        self.rating(player_id).map(display_rating)
    }

    pub fn history(&self, player_id: &str) -> &[f64] {
        self.per_player_history.get(player_id).map(Vec::as_slice).unwrap_or(&[])
    }

    // Deltas in replay order rather than keyed by id
    pub fn deltas_in_order<'a>(&'a self, matches: &[Match]) -> Vec<&'a EloDelta> {
        chronological_order(matches)
            .into_iter()
            .filter_map(|m| self.per_match_delta.get(&m.id))
            .collect()
    }
}

/// Unrounded ratings on both sides of one processed match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloUpdate {
    pub before_a: f64,
    pub before_b: f64,
    pub after_a: f64,
    pub after_b: f64,
    pub expected_a: f64,
}

impl EloUpdate {
    pub fn delta_a(&self) -> f64 {
        self.after_a - self.before_a
    }

    pub fn delta_b(&self) -> f64 {
        self.after_b - self.before_b
    }

    // Rounding happens per side, after the fact, and never feeds back into the replay
    pub fn to_delta(&self, match_id: &str) -> EloDelta {
        EloDelta {
            match_id: match_id.to_string(),
            elo_a_before: display_rating(self.before_a),
            elo_b_before: display_rating(self.before_b),
            delta_a: display_rating(self.delta_a()),
            delta_b: display_rating(self.delta_b()),
            expected_a: self.expected_a,
        }
    }
}

/// Running rating state for a replay. Every consumer that needs ratings "as of" a
/// point in the match sequence drives one of these over the chronological order.
#[derive(Debug, Clone)]
pub struct EloTracker<'c> {
    ratings: BTreeMap<PlayerId, f64>,
    ranking_context: &'c RankingContext,
}

impl<'c> EloTracker<'c> {
    pub fn new(ranking_context: &'c RankingContext) -> Self {
        Self {
            ratings: BTreeMap::new(),
            ranking_context,
        }
    }

    pub fn rating(&self, player_id: &str) -> Option<f64> {
        self.ratings.get(player_id).copied()
    }

    pub fn process(&mut self, m: &Match) -> EloUpdate {
        let rc = self.ranking_context;

        let before_a = *self.ratings.entry(m.player_a.clone()).or_insert(rc.starting_elo);
        let before_b = *self.ratings.entry(m.player_b.clone()).or_insert(rc.starting_elo);

        let expected_a = expected_score(before_a, before_b, rc);
        let score_a = m.outcome_a().score();

        let after_a = before_a + elo_result(score_a, expected_a, rc);
        let after_b = before_b + elo_result(1.0 - score_a, 1.0 - expected_a, rc);

        self.ratings.insert(m.player_a.clone(), after_a);
        self.ratings.insert(m.player_b.clone(), after_b);

        EloUpdate { before_a, before_b, after_a, after_b, expected_a }
    }

    pub fn into_ratings(self) -> BTreeMap<PlayerId, f64> {
        self.ratings
    }
}
