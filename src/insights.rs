use std::collections::BTreeMap;

use log::debug;
use rand::prelude::*;
use serde::Serialize;

use crate::chronology::{chronological_order, player_matches};
use crate::data_loader::*;
use crate::ranking::{EloTracker, EloUpdate};
use crate::ranking_context::RankingContext;
use crate::util::display_rating;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InsightKind {
    Streak,
    GameDiff,
    Elo,
    Activity,
    Rivalry,
    PerfectRecord,
    Upset,
    Dominance,
    MostImproved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub text: String,
    pub player_name: String,
    pub kind: InsightKind,
}

impl Insight {
    fn new(kind: InsightKind, player_name: &str, text: String) -> Self {
        Self {
            text,
            player_name: player_name.to_string(),
            kind,
        }
    }
}

/// A varying handful of talking points, different on every call.
pub fn generate_insights(players: &[Player], matches: &[Match], ranking_context: &RankingContext) -> Vec<Insight> {
    generate_insights_with_rng(players, matches, ranking_context, &mut rand::rng())
}

// Randomness is confined to this last step; pass a seeded rng to pin the selection.
pub fn generate_insights_with_rng<R: Rng + ?Sized>(
    players: &[Player],
    matches: &[Match],
    ranking_context: &RankingContext,
    rng: &mut R,
) -> Vec<Insight> {
    let mut candidates = insight_candidates(players, matches, ranking_context);
    debug!("{} insight candidates", candidates.len());

    candidates.shuffle(rng);
    candidates.truncate(ranking_context.insight_count);
    candidates
}

/// Every insight that currently applies, in rule order, before any selection.
pub fn insight_candidates(players: &[Player], matches: &[Match], ranking_context: &RankingContext) -> Vec<Insight> {
    if players.is_empty() || matches.is_empty() {
        return Vec::new();
    }

    let replay = Replay::new(players, matches, ranking_context);

    let mut insights = win_streaks(&replay, ranking_context);
    insights.extend(biggest_margin(&replay));
    insights.extend(fastest_riser(&replay, ranking_context));
    insights.extend(most_active(&replay));
    insights.extend(top_rivalry(&replay, ranking_context));
    insights.extend(perfect_records(&replay, ranking_context));
    insights.extend(biggest_upset(&replay, ranking_context));
    insights.extend(most_dominant(&replay));
    insights.extend(most_improved(&replay, ranking_context));
    insights
}

// One chronological pass shared by every rule
struct Replay<'a> {
    players: &'a [Player],
    names: BTreeMap<&'a str, &'a str>,
    ordered: Vec<&'a Match>,
    updates: Vec<EloUpdate>,
    // Player ids in order of their first match, used to break ties
    appearance: Vec<&'a str>,
    history: BTreeMap<&'a str, Vec<i64>>,
    final_ratings: BTreeMap<PlayerId, f64>,
}

impl<'a> Replay<'a> {
    fn new(players: &'a [Player], matches: &'a [Match], ranking_context: &RankingContext) -> Self {
        let ordered = chronological_order(matches);
        let mut tracker = EloTracker::new(ranking_context);
        let mut updates = Vec::with_capacity(ordered.len());
        let mut appearance = Vec::new();
        let mut history: BTreeMap<&str, Vec<i64>> = BTreeMap::new();

        for &m in &ordered {
            let update = tracker.process(m);
            for (id, after) in [(m.player_a.as_str(), update.after_a), (m.player_b.as_str(), update.after_b)] {
                let points = history.entry(id).or_default();
                if points.is_empty() { appearance.push(id); }
                points.push(display_rating(after));
            }
            updates.push(update);
        }

        Self {
            players,
            names: players.iter().map(|p| (p.id.as_str(), p.name.as_str())).collect(),
            ordered,
            updates,
            appearance,
            history,
            final_ratings: tracker.into_ratings(),
        }
    }

    fn name(&self, id: &str) -> Option<&'a str> {
        self.names.get(id).copied()
    }

    // Wins and total matches for a registered player
    fn record(&self, player_id: &str) -> (u32, u32) {
        let own = player_matches(&self.ordered, player_id);
        let wins = own.iter().filter(|m| m.outcome_for(player_id) == Outcome::Win).count();
        (wins as u32, own.len() as u32)
    }

    // Unordered pairs in order of their first meeting, with per-side win counts
    fn pairings(&self) -> Vec<Pairing<'a>> {
        let mut pairings: Vec<Pairing> = Vec::new();
        for &m in &self.ordered {
            let (first, second) = if m.player_a <= m.player_b {
                (m.player_a.as_str(), m.player_b.as_str())
            } else {
                (m.player_b.as_str(), m.player_a.as_str())
            };

            let idx = match pairings.iter().position(|p| p.first == first && p.second == second) {
                Some(idx) => idx,
                None => {
                    pairings.push(Pairing { first, second, opener: m, count: 0, first_wins: 0, second_wins: 0 });
                    pairings.len() - 1
                }
            };

            let pairing = &mut pairings[idx];
            pairing.count += 1;
            match m.winner().map(String::as_str) {
                Some(w) if w == first => pairing.first_wins += 1,
                Some(_) => pairing.second_wins += 1,
                None => {}
            }
        }
        pairings
    }
}

struct Pairing<'a> {
    first: &'a str,
    second: &'a str,
    opener: &'a Match,
    count: u32,
    first_wins: u32,
    second_wins: u32,
}

fn win_streaks(replay: &Replay, ranking_context: &RankingContext) -> Vec<Insight> {
    let mut insights = Vec::new();
    for p in replay.players {
        let streak = player_matches(&replay.ordered, &p.id)
            .iter()
            .rev()
            .take_while(|m| m.outcome_for(&p.id) == Outcome::Win)
            .count() as u32;

        if streak >= ranking_context.min_streak_insight {
            insights.push(Insight::new(
                InsightKind::Streak,
                &p.name,
                format!("{} is on a {}-match win streak!", p.name, streak),
            ));
        }
    }
    insights
}

fn biggest_margin(replay: &Replay) -> Option<Insight> {
    let mut best: Option<&Match> = None;
    for &m in &replay.ordered {
        if m.margin() > best.map_or(0, |b| b.margin()) {
            best = Some(m);
        }
    }

    let m = best?;
    let winner = replay.name(m.winner()?)?;
    Some(Insight::new(
        InsightKind::GameDiff,
        winner,
        format!("{} holds the biggest win margin: {}-{}", winner, m.games_a, m.games_b),
    ))
}

fn fastest_riser(replay: &Replay, ranking_context: &RankingContext) -> Option<Insight> {
    let window = ranking_context.rising_window.max(1);
    let mut best: Option<(&str, i64)> = None;

    for &id in &replay.appearance {
        let Some(history) = replay.history.get(id) else { continue };
        if history.len() < window { continue; }
        let Some(name) = replay.name(id) else { continue };

        let rise = history[history.len() - 1] - history[history.len() - window];
        if rise > best.map_or(0, |(_, r)| r) {
            best = Some((name, rise));
        }
    }

    let (name, rise) = best?;
    if (rise as f64) <= ranking_context.rising_min_gain { return None; }

    Some(Insight::new(
        InsightKind::Elo,
        name,
        format!("{} is climbing fast, Elo up {} pts in recent matches", name, rise),
    ))
}

fn most_active(replay: &Replay) -> Option<Insight> {
    let mut best: Option<(&str, usize)> = None;
    for &id in &replay.appearance {
        let n = replay.history.get(id).map_or(0, Vec::len);
        let Some(name) = replay.name(id) else { continue };
        if n > best.map_or(0, |(_, b)| b) {
            best = Some((name, n));
        }
    }

    let (name, n) = best?;
    Some(Insight::new(
        InsightKind::Activity,
        name,
        format!("{} leads with {} matches played", name, n),
    ))
}

fn top_rivalry(replay: &Replay, ranking_context: &RankingContext) -> Option<Insight> {
    let mut best: Option<Pairing> = None;
    for pairing in replay.pairings() {
        if pairing.count > best.as_ref().map_or(0, |b| b.count) {
            best = Some(pairing);
        }
    }

    let top = best?;
    if top.count < ranking_context.min_rivalry_matches { return None; }

    let a = replay.name(&top.opener.player_a)?;
    let b = replay.name(&top.opener.player_b)?;
    Some(Insight::new(
        InsightKind::Rivalry,
        a,
        format!("{} vs {}: {} matches and counting!", a, b, top.count),
    ))
}

fn perfect_records(replay: &Replay, ranking_context: &RankingContext) -> Vec<Insight> {
    replay.players.iter()
        .filter(|p| {
            let (wins, total) = replay.record(&p.id);
            total >= ranking_context.min_perfect_record && wins == total
        })
        .map(|p| Insight::new(
            InsightKind::PerfectRecord,
            &p.name,
            format!("{} is undefeated with a perfect record!", p.name),
        ))
        .collect()
}

// Lower-rated winner against a higher-rated opponent, judged on ratings going into the match
fn biggest_upset(replay: &Replay, ranking_context: &RankingContext) -> Option<Insight> {
    let mut best: Option<(&Match, f64)> = None;

    for (m, update) in replay.ordered.iter().copied().zip(&replay.updates) {
        let gap = match m.outcome_a() {
            Outcome::Win if update.before_a < update.before_b => update.before_b - update.before_a,
            Outcome::Loss if update.before_b < update.before_a => update.before_a - update.before_b,
            _ => continue,
        };
        if gap > best.map_or(0.0, |(_, g)| g) {
            best = Some((m, gap));
        }
    }

    let (m, gap) = best?;
    if gap <= ranking_context.min_upset_gap { return None; }

    let winner_id = m.winner()?;
    let winner = replay.name(winner_id)?;
    let loser = replay.name(m.other_player(winner_id))?;
    Some(Insight::new(
        InsightKind::Upset,
        winner,
        format!("{} pulled off a massive upset, defeating {} who was {} Elo points higher!",
            winner, loser, gap.round() as i64),
    ))
}

// A rivalry where one side has won at least two more and never lost
fn most_dominant(replay: &Replay) -> Option<Insight> {
    let mut best: Option<(&str, &str, u32)> = None;

    for pairing in replay.pairings() {
        let (leader, trailer, wins, losses) = if pairing.first_wins >= pairing.second_wins {
            (pairing.first, pairing.second, pairing.first_wins, pairing.second_wins)
        } else {
            (pairing.second, pairing.first, pairing.second_wins, pairing.first_wins)
        };

        if losses != 0 || wins <= losses + 1 { continue; }
        if wins > best.map_or(0, |(_, _, w)| w) {
            best = Some((leader, trailer, wins));
        }
    }

    let (leader, trailer, wins) = best?;
    let leader = replay.name(leader)?;
    let trailer = replay.name(trailer)?;
    Some(Insight::new(
        InsightKind::Dominance,
        leader,
        format!("{} dominates {} {}-0 in head-to-head!", leader, trailer, wins),
    ))
}

fn most_improved(replay: &Replay, ranking_context: &RankingContext) -> Option<Insight> {
    let mut best: Option<(&str, f64)> = None;

    for &id in &replay.appearance {
        let Some(rating) = replay.final_ratings.get(id) else { continue };
        let Some(name) = replay.name(id) else { continue };
        let gain = rating - ranking_context.starting_elo;
        if gain > best.map_or(0.0, |(_, g)| g) {
            best = Some((name, gain));
        }
    }

    let (name, gain) = best?;
    if gain <= ranking_context.min_improvement { return None; }

    Some(Insight::new(
        InsightKind::MostImproved,
        name,
        format!("{} has the biggest Elo improvement, up {} pts total!", name, gain.round() as i64),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn players() -> Vec<Player> {
        vec![
            Player::new("a", "Ana"),
            Player::new("b", "Ben"),
            Player::new("c", "Cleo"),
            Player::new("d", "Dev"),
        ]
    }

    fn win(id: &str, d: u32, winner: &str, loser: &str) -> Match {
        Match::new(id, day(d), winner, loser, 6, 2)
    }

    #[test]
    fn streak_rule_needs_two_straight_wins() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            win("m1", 1, "b", "a"),
            win("m2", 2, "a", "c"),
            win("m3", 3, "a", "d"),
            win("m4", 4, "b", "c"),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        let streaks = win_streaks(&replay, &rc);

        assert_eq!(streaks.len(), 2);
        assert_eq!(streaks[0].player_name, "Ana");
        assert_eq!(streaks[0].text, "Ana is on a 2-match win streak!");
        assert_eq!(streaks[1].player_name, "Ben");
        assert!(streaks.iter().all(|i| i.kind == InsightKind::Streak));
    }

    #[test]
    fn margin_rule_picks_first_largest() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            Match::new("m1", day(1), "a", "b", 6, 4),
            Match::new("m2", day(2), "c", "d", 0, 6),
            Match::new("m3", day(3), "a", "c", 6, 0),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        let insight = biggest_margin(&replay).unwrap();

        assert_eq!(insight.player_name, "Dev");
        assert_eq!(insight.text, "Dev holds the biggest win margin: 0-6");
    }

    #[test]
    fn margin_rule_skips_all_draws() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![Match::new("m1", day(1), "a", "b", 6, 6)];
        let replay = Replay::new(&players, &matches, &rc);

        assert!(biggest_margin(&replay).is_none());
    }

    #[test]
    fn riser_rule_needs_more_than_ten_points() {
        let rc = RankingContext::default();
        let players = players();
        let climbing = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "a", "c"),
            win("m3", 3, "a", "d"),
        ];
        let replay = Replay::new(&players, &climbing, &rc);

        let insight = fastest_riser(&replay, &rc).unwrap();
        assert_eq!(insight.player_name, "Ana");
        assert_eq!(insight.kind, InsightKind::Elo);

        let flat = vec![
            Match::new("m1", day(1), "a", "b", 6, 6),
            Match::new("m2", day(2), "a", "b", 6, 6),
            Match::new("m3", day(3), "a", "b", 6, 6),
        ];
        let replay = Replay::new(&players, &flat, &rc);
        assert!(fastest_riser(&replay, &rc).is_none());
    }

    #[test]
    fn equal_risers_go_to_the_earlier_player() {
        let mut rc = RankingContext::default();
        rc.rising_window = 2;
        let players = players();
        let matches = vec![
            win("m1", 1, "d", "c"),
            win("m2", 2, "d", "c"),
            win("m3", 3, "a", "b"),
            win("m4", 4, "a", "b"),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        let insight = fastest_riser(&replay, &rc).unwrap();

        // Ana and Dev climbed the same 15 points, Dev played first
        assert_eq!(insight.player_name, "Dev");
        assert_eq!(insight.text, "Dev is climbing fast, Elo up 15 pts in recent matches");
    }

    #[test]
    fn activity_rule_counts_matches() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "c", "b"),
            win("m3", 3, "d", "c"),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        let insight = most_active(&replay).unwrap();

        // b and c both played twice, b showed up first
        assert_eq!(insight.player_name, "Ben");
        assert_eq!(insight.text, "Ben leads with 2 matches played");
    }

    #[test]
    fn rivalry_rule_needs_two_meetings() {
        let rc = RankingContext::default();
        let players = players();

        let once = vec![win("m1", 1, "a", "b"), win("m2", 2, "c", "d")];
        let replay = Replay::new(&players, &once, &rc);
        assert!(top_rivalry(&replay, &rc).is_none());

        let twice = vec![win("m1", 1, "c", "b"), win("m2", 2, "b", "c"), win("m3", 3, "a", "d")];
        let replay = Replay::new(&players, &twice, &rc);
        let insight = top_rivalry(&replay, &rc).unwrap();
        assert_eq!(insight.text, "Cleo vs Ben: 2 matches and counting!");
        assert_eq!(insight.player_name, "Cleo");
    }

    #[test]
    fn perfect_record_rule() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "a", "c"),
            win("m3", 3, "a", "d"),
            win("m4", 4, "b", "c"),
            win("m5", 5, "b", "d"),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        let insights = perfect_records(&replay, &rc);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].player_name, "Ana");
        assert_eq!(insights[0].kind, InsightKind::PerfectRecord);
    }

    #[test]
    fn draw_breaks_perfect_record() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "a", "c"),
            Match::new("m3", day(3), "a", "d", 6, 6),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        assert!(perfect_records(&replay, &rc).is_empty());
    }

    #[test]
    fn upset_rule_uses_pre_match_ratings() {
        let rc = RankingContext::default();
        let players = players();
        // a climbs to ~1045, d sits at ~984, then d beats a: gap ~61 going in
        let matches = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "a", "c"),
            win("m3", 3, "a", "b"),
            win("m4", 4, "c", "d"),
            win("m5", 5, "d", "a"),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        let insight = biggest_upset(&replay, &rc).unwrap();

        assert_eq!(insight.player_name, "Dev");
        assert!(insight.text.starts_with("Dev pulled off a massive upset, defeating Ana"));
    }

    #[test]
    fn small_upsets_are_not_reported() {
        let rc = RankingContext::default();
        let players = players();
        // b goes in 16 points below c, under the reporting gap
        let matches = vec![win("m1", 1, "a", "b"), win("m2", 2, "b", "c")];
        let replay = Replay::new(&players, &matches, &rc);

        assert!(biggest_upset(&replay, &rc).is_none());
    }

    #[test]
    fn dominance_rule_requires_clean_sheet() {
        let rc = RankingContext::default();
        let players = players();

        let clean = vec![win("m1", 1, "b", "a"), win("m2", 2, "a", "b"), win("m3", 3, "c", "d"), win("m4", 4, "d", "c")];
        let replay = Replay::new(&players, &clean, &rc);
        assert!(most_dominant(&replay).is_none());

        let sweep = vec![win("m1", 1, "d", "c"), win("m2", 2, "d", "c").swap_sides(), win("m3", 3, "a", "b")];
        let replay = Replay::new(&players, &sweep, &rc);
        let insight = most_dominant(&replay).unwrap();
        assert_eq!(insight.text, "Dev dominates Cleo 2-0 in head-to-head!");
    }

    #[test]
    fn dominance_prefers_more_wins() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "a", "b"),
            win("m3", 3, "c", "d"),
            win("m4", 4, "c", "d"),
            win("m5", 5, "c", "d"),
        ];
        let replay = Replay::new(&players, &matches, &rc);

        let insight = most_dominant(&replay).unwrap();
        assert_eq!(insight.player_name, "Cleo");
        assert_eq!(insight.kind, InsightKind::Dominance);
    }

    #[test]
    fn most_improved_needs_twenty_points() {
        let rc = RankingContext::default();
        let players = players();

        let one_win = vec![win("m1", 1, "a", "b")];
        let replay = Replay::new(&players, &one_win, &rc);
        assert!(most_improved(&replay, &rc).is_none());

        let two_wins = vec![win("m1", 1, "a", "b"), win("m2", 2, "a", "c")];
        let replay = Replay::new(&players, &two_wins, &rc);
        let insight = most_improved(&replay, &rc).unwrap();
        assert_eq!(insight.player_name, "Ana");
        assert_eq!(insight.text, "Ana has the biggest Elo improvement, up 31 pts total!");
    }

    #[test]
    fn equal_improvement_goes_to_the_earlier_player() {
        let mut rc = RankingContext::default();
        rc.min_improvement = 10.0;
        let players = players();
        let matches = vec![win("m1", 1, "d", "c"), win("m2", 2, "a", "b")];
        let replay = Replay::new(&players, &matches, &rc);

        let insight = most_improved(&replay, &rc).unwrap();

        assert_eq!(insight.player_name, "Dev");
    }

    #[test]
    fn selection_is_capped_and_drawn_from_candidates() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "a", "c"),
            win("m3", 3, "a", "d"),
            win("m4", 4, "a", "b"),
        ];

        let candidates = insight_candidates(&players, &matches, &rc);
        assert!(candidates.len() > 2);

        let mut rng = StdRng::seed_from_u64(7);
        let picked = generate_insights_with_rng(&players, &matches, &rc, &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|i| candidates.contains(i)));

        let unseeded = generate_insights(&players, &matches, &rc);
        assert_eq!(unseeded.len(), 2);
    }

    #[test]
    fn seeded_selection_is_reproducible() {
        let rc = RankingContext::default();
        let players = players();
        let matches = vec![
            win("m1", 1, "a", "b"),
            win("m2", 2, "a", "c"),
            win("m3", 3, "a", "d"),
            win("m4", 4, "a", "b"),
        ];

        let first = generate_insights_with_rng(&players, &matches, &rc, &mut StdRng::seed_from_u64(42));
        let second = generate_insights_with_rng(&players, &matches, &rc, &mut StdRng::seed_from_u64(42));

        assert_eq!(first, second);
    }

    #[test]
    fn nothing_to_say_without_matches() {
        let rc = RankingContext::default();
        assert!(generate_insights(&players(), &[], &rc).is_empty());
        assert!(insight_candidates(&[], &[win("m1", 1, "a", "b")], &rc).is_empty());
    }

    trait SwapSides {
        fn swap_sides(self) -> Self;
    }

    impl SwapSides for Match {
        // Same result, the winner listed as player B
        fn swap_sides(mut self) -> Self {
            std::mem::swap(&mut self.player_a, &mut self.player_b);
            std::mem::swap(&mut self.games_a, &mut self.games_b);
            self
        }
    }
}
