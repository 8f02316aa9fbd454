use std::collections::BTreeMap;

use serde::Serialize;

use crate::chronology::chronological_order;
use crate::data_loader::*;
use crate::ranking::compute_elo;
use crate::ranking_context::RankingContext;

/// Outcome record of one player against one specific opponent, from the first
/// player's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub games_for: u64,
    pub games_against: u64,
}

impl HeadToHeadRecord {
    fn record(&mut self, outcome: Outcome, games_for: u32, games_against: u32) {
        self.games_for += u64::from(games_for);
        self.games_against += u64::from(games_against);

        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn matches(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

pub type HeadToHeadMatrix = BTreeMap<PlayerId, BTreeMap<PlayerId, HeadToHeadRecord>>;

// Every ordered pair of distinct registered players gets a record, zeroed up front.
// Order of matches doesn't matter here, it's a plain aggregate.
pub fn compute_head_to_head(players: &[Player], matches: &[Match]) -> HeadToHeadMatrix {
    let mut h2h: HeadToHeadMatrix = BTreeMap::new();
    for p in players {
        let row = h2h.entry(p.id.clone()).or_default();
        for q in players {
            if p.id == q.id { continue; }
            row.insert(q.id.clone(), HeadToHeadRecord::default());
        }
    }

    for m in matches {
        let registered = h2h.get(&m.player_a).is_some_and(|row| row.contains_key(&m.player_b));
        if !registered { continue; }

        let outcome_a = m.outcome_a();
        let outcome_b = m.outcome_for(&m.player_b);

        if let Some(record) = h2h.get_mut(&m.player_a).and_then(|row| row.get_mut(&m.player_b)) {
            record.record(outcome_a, m.games_a, m.games_b);
        }
        if let Some(record) = h2h.get_mut(&m.player_b).and_then(|row| row.get_mut(&m.player_a)) {
            record.record(outcome_b, m.games_b, m.games_a);
        }
    }

    h2h
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SurfaceRecord {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginMatch {
    pub match_id: MatchId,
    pub games_for: u32,
    pub games_against: u32,
    pub margin: u32,
}

/// Everything the interactive rivalry view shows for one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairDetail {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub record: HeadToHeadRecord,
    pub surfaces: BTreeMap<Surface, SurfaceRecord>,
    pub closest: Option<MarginMatch>,
    pub largest_margin: Option<MarginMatch>,
    pub elo_a: Option<i64>,
    pub elo_b: Option<i64>,
}

// Rivalry detail from player_a's side. Ratings come from the full league replay, not just
// the matches between these two, since a rating depends on every match a player played.
pub fn pair_detail(player_a: &str, player_b: &str, matches: &[Match], ranking_context: &RankingContext) -> PairDetail {
    let mut record = HeadToHeadRecord::default();
    let mut surfaces: BTreeMap<Surface, SurfaceRecord> = BTreeMap::new();
    let mut closest: Option<MarginMatch> = None;
    let mut largest_margin: Option<MarginMatch> = None;

    let rivalry = chronological_order(matches)
        .into_iter()
        .filter(|m| m.involves(player_a) && m.involves(player_b) && player_a != player_b);

    for m in rivalry {
        let (gf, ga) = m.games_for(player_a);
        let outcome = m.outcome_for(player_a);
        record.record(outcome, gf, ga);

        if let Some(surface) = m.surface {
            let entry = surfaces.entry(surface).or_default();
            match outcome {
                Outcome::Win => entry.wins += 1,
                Outcome::Loss => entry.losses += 1,
                Outcome::Draw => {}
            }
        }

        let candidate = MarginMatch {
            match_id: m.id.clone(),
            games_for: gf,
            games_against: ga,
            margin: m.margin(),
        };

        // Strict comparisons: the earliest match keeps the title on ties
        if closest.as_ref().is_none_or(|c| candidate.margin < c.margin) {
            closest = Some(candidate.clone());
        }
        if largest_margin.as_ref().is_none_or(|l| candidate.margin > l.margin) {
            largest_margin = Some(candidate);
        }
    }

    let replay = compute_elo(&[], matches, ranking_context);

    PairDetail {
        player_a: player_a.to_string(),
        player_b: player_b.to_string(),
        record,
        surfaces,
        closest,
        largest_margin,
        elo_a: replay.display_rating(player_a),
        elo_b: replay.display_rating(player_b),
    }
}
