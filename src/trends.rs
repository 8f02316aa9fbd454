use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::chronology::{chronological_order, player_matches};
use crate::data_loader::*;
use crate::ranking::compute_elo;
use crate::ranking_context::RankingContext;
use crate::util::{display_rating, fraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn classify(recent: f64, older: f64, threshold: f64) -> Self {
        let diff = recent - older;
        if diff > threshold {
            Trend::Up
        } else if diff < -threshold {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Neutral => "·",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTrend {
    pub w_pct_trend: Trend,
    pub g_pct_trend: Trend,
    pub elo_trend: Trend,
}

impl PlayerTrend {
    fn neutral() -> Self {
        Self {
            w_pct_trend: Trend::Neutral,
            g_pct_trend: Trend::Neutral,
            elo_trend: Trend::Neutral,
        }
    }
}

// Win and game share over a slice of one player's matches, both as fractions
fn form(matches: &[&Match], player_id: &str) -> (f64, f64) {
    let (mut won, mut games_for, mut games_against) = (0u64, 0u64, 0u64);
    for m in matches {
        let (gf, ga) = m.games_for(player_id);
        games_for += u64::from(gf);
        games_against += u64::from(ga);
        if m.outcome_for(player_id) == Outcome::Win { won += 1; }
    }

    (fraction(won, matches.len() as u64), fraction(games_for, games_for + games_against))
}

// Compares each player's last `trend_window` matches against everything before them.
// Elo compares the current rating with the one recorded `trend_window` matches back.
pub fn compute_trends(players: &[Player], matches: &[Match], ranking_context: &RankingContext) -> BTreeMap<PlayerId, PlayerTrend> {
    let window = ranking_context.trend_window.max(1);
    let ordered = chronological_order(matches);
    let replay = compute_elo(players, matches, ranking_context);

    let mut trends = BTreeMap::new();
    for p in players {
        let own = player_matches(&ordered, &p.id);
        if own.len() < 2 {
            trends.insert(p.id.clone(), PlayerTrend::neutral());
            continue;
        }

        let split = own.len().saturating_sub(window);
        let (older, recent) = own.split_at(split);

        let (w_pct_trend, g_pct_trend) = if older.is_empty() {
            (Trend::Neutral, Trend::Neutral)
        } else {
            let (recent_w, recent_g) = form(recent, &p.id);
            let (older_w, older_g) = form(older, &p.id);
            (
                Trend::classify(recent_w, older_w, ranking_context.pct_trend_threshold),
                Trend::classify(recent_g, older_g, ranking_context.pct_trend_threshold),
            )
        };

        let history = replay.history(&p.id);
        let elo_trend = match history.last() {
            Some(&current) => {
                let back = history[history.len().saturating_sub(1 + window)];
                Trend::classify(
                    display_rating(current) as f64,
                    display_rating(back) as f64,
                    ranking_context.elo_trend_threshold,
                )
            }
            None => Trend::Neutral,
        };

        trends.insert(p.id.clone(), PlayerTrend { w_pct_trend, g_pct_trend, elo_trend });
    }

    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    fn players() -> Vec<Player> {
        vec![Player::new("a", "Ana"), Player::new("b", "Ben")]
    }

    #[test]
    fn classify_respects_thresholds() {
        assert_eq!(Trend::classify(0.55, 0.50, 0.02), Trend::Up);
        assert_eq!(Trend::classify(0.50, 0.55, 0.02), Trend::Down);
        assert_eq!(Trend::classify(0.51, 0.50, 0.02), Trend::Neutral);
        assert_eq!(Trend::classify(1006.0, 1000.0, 5.0), Trend::Up);
        assert_eq!(Trend::classify(1005.0, 1000.0, 5.0), Trend::Neutral);
    }

    #[test]
    fn too_few_matches_is_neutral() {
        let rc = RankingContext::default();
        let matches = vec![Match::new("m1", day(1), "a", "b", 6, 0)];

        let trends = compute_trends(&players(), &matches, &rc);

        assert_eq!(trends["a"], PlayerTrend::neutral());
        assert_eq!(trends["b"], PlayerTrend::neutral());
    }

    #[test]
    fn no_older_matches_keeps_percentages_neutral() {
        let rc = RankingContext::default();
        let matches = vec![
            Match::new("m1", day(1), "a", "b", 6, 0),
            Match::new("m2", day(2), "a", "b", 6, 0),
        ];

        let trends = compute_trends(&players(), &matches, &rc);

        // Two matches fit inside the window, so there is nothing older to compare against.
        // Elo still compares against the first recorded point.
        assert_eq!(trends["a"].w_pct_trend, Trend::Neutral);
        assert_eq!(trends["a"].g_pct_trend, Trend::Neutral);
        assert_eq!(trends["a"].elo_trend, Trend::Up);
        assert_eq!(trends["b"].elo_trend, Trend::Down);
    }

    #[test]
    fn recent_slump_trends_down() {
        let rc = RankingContext::default();
        let mut matches = Vec::new();
        for d in 1..=3 {
            matches.push(Match::new(&format!("w{d}"), day(d), "a", "b", 6, 1));
        }
        for d in 4..=6 {
            matches.push(Match::new(&format!("l{d}"), day(d), "a", "b", 1, 6));
        }

        let trends = compute_trends(&players(), &matches, &rc);

        assert_eq!(trends["a"].w_pct_trend, Trend::Down);
        assert_eq!(trends["a"].g_pct_trend, Trend::Down);
        assert_eq!(trends["a"].elo_trend, Trend::Down);
        assert_eq!(trends["b"].w_pct_trend, Trend::Up);
        assert_eq!(trends["b"].elo_trend, Trend::Up);
    }

    #[test]
    fn huge_game_counts_compare_cleanly() {
        let rc = RankingContext::default().with_trend_window(1);
        let matches: Vec<Match> = (1..=4)
            .map(|d| Match::new(&format!("m{d}"), day(d), "a", "b", 4_000_000_000, 4_000_000_000))
            .collect();

        let trends = compute_trends(&players(), &matches, &rc);

        assert_eq!(trends["a"].g_pct_trend, Trend::Neutral);
        assert_eq!(trends["a"].w_pct_trend, Trend::Neutral);
    }

    #[test]
    fn window_size_changes_the_split() {
        let rc = RankingContext::default().with_trend_window(1);
        let matches = vec![
            Match::new("m1", day(1), "a", "b", 6, 1),
            Match::new("m2", day(2), "a", "b", 1, 6),
            Match::new("m3", day(3), "a", "b", 6, 1),
        ];

        let trends = compute_trends(&players(), &matches, &rc);

        // Last match won (100%) against 50% before it
        assert_eq!(trends["a"].w_pct_trend, Trend::Up);

        let default_window = compute_trends(&players(), &matches, &RankingContext::default());
        assert_eq!(default_window["a"].w_pct_trend, Trend::Neutral);
    }
}
