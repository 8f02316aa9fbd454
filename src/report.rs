use std::collections::BTreeMap;
use std::fmt::Write;

use crate::data_loader::*;
use crate::head_to_head::{HeadToHeadMatrix, PairDetail};
use crate::history::HistoryPoint;
use crate::insights::Insight;
use crate::ranking::EloDelta;
use crate::standings::Standing;
use crate::summary::PlayerSummary;
use crate::trends::PlayerTrend;

// Plain-text tables for the terminal. Every renderer returns a String so callers decide
// where it goes. writeln! into a String cannot fail, hence the ignored results.

pub fn standings_report(standings: &[Standing], trends: &BTreeMap<PlayerId, PlayerTrend>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "|  #  | {0:20} | {1:>3} | {2:>3} | {3:>3} | {4:>3} | {5:>6} | {6:>7} | {7:>6} | {8:>5} | Trend",
        "Player", "M", "W", "D", "L", "W%", "G+/G-", "G%", "Elo");

    for (i, s) in standings.iter().enumerate() {
        let trend = trends.get(&s.player_id)
            .map(|t| format!("{}{}{}", t.w_pct_trend.arrow(), t.g_pct_trend.arrow(), t.elo_trend.arrow()))
            .unwrap_or_default();

        let _ = writeln!(out, "|{0:3}. | {1:20} | {2:3} | {3:3} | {4:3} | {5:3} | {6:6.1} | {7:>7} | {8:6.1} | {9:5} | {10}",
            i + 1,
            s.player_name,
            s.matches,
            s.matches_won,
            s.matches_drawn,
            s.matches_lost,
            s.matches_won_pct,
            format!("{}/{}", s.games_for, s.games_against),
            s.games_won_pct,
            s.elo,
            trend,
        );
    }
    out
}

pub fn elo_report(deltas: &[&EloDelta], matches: &[Match], players: &[Player]) -> String {
    let mut out = String::new();
    for d in deltas {
        let Some(m) = matches.iter().find(|m| m.id == d.match_id) else { continue };

        let _ = writeln!(out, "{0} | {1:>20} {2:>5} ({3:+3}) | {4:2}-{5:<2} | {6:<20} {7:>5} ({8:+3}) | exp {9:.2}",
            m.date,
            player_name(players, &m.player_a),
            d.elo_a_before,
            d.delta_a,
            m.games_a,
            m.games_b,
            player_name(players, &m.player_b),
            d.elo_b_before,
            d.delta_b,
            d.expected_a,
        );
    }
    out
}

pub fn head_to_head_report(matrix: &HeadToHeadMatrix, players: &[Player]) -> String {
    let mut out = String::new();
    let _ = write!(out, "{0:20}", "");
    for p in players {
        let _ = write!(out, " | {0:>10}", truncate(&p.name, 10));
    }
    let _ = writeln!(out);

    for p in players {
        let _ = write!(out, "{0:20}", truncate(&p.name, 20));
        for q in players {
            let cell = match matrix.get(&p.id).and_then(|row| row.get(&q.id)) {
                Some(r) if r.matches() > 0 => format!("{}-{}-{}", r.wins, r.draws, r.losses),
                Some(_) => String::from("."),
                None => String::from("x"),
            };
            let _ = write!(out, " | {0:>10}", cell);
        }
        let _ = writeln!(out);
    }
    out
}

pub fn pair_report(detail: &PairDetail, players: &[Player]) -> String {
    let a = player_name(players, &detail.player_a);
    let b = player_name(players, &detail.player_b);
    let r = &detail.record;

    let mut out = String::new();
    let _ = writeln!(out, "{} vs {}: {}W {}D {}L, games {}-{}", a, b, r.wins, r.draws, r.losses, r.games_for, r.games_against);

    for (surface, s) in &detail.surfaces {
        let _ = writeln!(out, "  {0:6} {1}W {2}L", surface, s.wins, s.losses);
    }
    if let Some(c) = &detail.closest {
        let _ = writeln!(out, "  Closest match:  {} ({}-{})", c.match_id, c.games_for, c.games_against);
    }
    if let Some(l) = &detail.largest_margin {
        let _ = writeln!(out, "  Largest margin: {} ({}-{})", l.match_id, l.games_for, l.games_against);
    }

    let _ = writeln!(out, "  Elo: {} {} / {} {}", a, rating_or_dash(detail.elo_a), b, rating_or_dash(detail.elo_b));
    out
}

pub fn trends_report(trends: &BTreeMap<PlayerId, PlayerTrend>, players: &[Player]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{0:20} | {1:7} | {2:7} | {3:7}", "Player", "W%", "G%", "Elo");
    for p in players {
        let Some(t) = trends.get(&p.id) else { continue };
        let _ = writeln!(out, "{0:20} | {1:7} | {2:7} | {3:7}", p.name, t.w_pct_trend, t.g_pct_trend, t.elo_trend);
    }
    out
}

pub fn summary_report(summaries: &BTreeMap<PlayerId, PlayerSummary>, players: &[Player]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{0:20} | {1:20} | {2:20} | {3:>5} | {4:>5} | {5:>6}",
        "Player", "Best vs", "Worst vs", "GF/m", "GA/m", "Streak");

    for p in players {
        let Some(s) = summaries.get(&p.id) else { continue };
        let _ = writeln!(out, "{0:20} | {1:20} | {2:20} | {3:5.1} | {4:5.1} | {5:>6}",
            p.name,
            s.best_opponent.as_deref().unwrap_or("-"),
            s.worst_opponent.as_deref().unwrap_or("-"),
            s.avg_games_for,
            s.avg_games_against,
            s.current_streak.map(|st| st.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }
    out
}

pub fn history_report(player: &Player, points: &[HistoryPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", player.name);
    for pt in points {
        let _ = writeln!(out, "{0:4}. | W% {1:5.1} | G% {2:5.1} | Elo {3:5}",
            pt.match_index, pt.matches_won_pct, pt.games_won_pct, pt.elo);
    }
    out
}

pub fn insights_report(insights: &[Insight]) -> String {
    let mut out = String::new();
    for i in insights {
        let _ = writeln!(out, "* {}", i.text);
    }
    out
}

fn player_name<'a>(players: &'a [Player], id: &'a str) -> &'a str {
    players.iter()
        .find(|p| p.id == id)
        .map_or(id, |p| p.name.as_str())
}

fn rating_or_dash(rating: Option<i64>) -> String {
    rating.map_or_else(|| "-".to_string(), |r| r.to_string())
}

fn truncate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::head_to_head::compute_head_to_head;
    use crate::ranking_context::RankingContext;
    use crate::standings::compute_standings;
    use crate::trends::compute_trends;
    use chrono::NaiveDate;

    fn fixture() -> (Vec<Player>, Vec<Match>) {
        let day = |d| NaiveDate::from_ymd_opt(2025, 2, d).unwrap();
        (
            vec![Player::new("p1", "Ana"), Player::new("p2", "Ben"), Player::new("p3", "Cleo")],
            vec![Match::new("m1", day(1), "p1", "p2", 3, 1)],
        )
    }

    #[test]
    fn standings_table_lists_every_player_in_rank_order() {
        let rc = RankingContext::default();
        let (players, matches) = fixture();
        let standings = compute_standings(&players, &matches, &rc);
        let trends = compute_trends(&players, &matches, &rc);

        let table = standings_report(&standings, &trends);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("Ana") && lines[1].contains("1016"));
        assert!(lines[2].contains("Cleo") && lines[2].contains("1000"));
        assert!(lines[3].contains("Ben") && lines[3].contains("984"));
    }

    #[test]
    fn matrix_marks_the_diagonal() {
        let (players, matches) = fixture();
        let matrix = compute_head_to_head(&players, &matches);

        let table = head_to_head_report(&matrix, &players);
        let ana_row = table.lines().nth(1).unwrap();

        assert!(ana_row.starts_with("Ana"));
        assert!(ana_row.contains("x"));
        assert!(ana_row.contains("1-0-0"));
    }

    #[test]
    fn names_fall_back_to_ids() {
        let (players, _) = fixture();
        assert_eq!(player_name(&players, "p2"), "Ben");
        assert_eq!(player_name(&players, "ghost"), "ghost");
    }
}
