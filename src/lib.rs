pub mod chronology;
pub mod cli;
pub mod data_loader;
pub mod error;
pub mod head_to_head;
pub mod history;
pub mod insights;
pub mod ranking;
pub mod ranking_context;
pub mod report;
pub mod standings;
pub mod summary;
pub mod trends;
pub mod util;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use cli::{Cli, Command, Format, Source};
use data_loader::League;
use ranking_context::RankingContext;

pub use chronology::chronological_order;
pub use data_loader::{Match, Outcome, Player, Surface};
pub use error::LeagueError;
pub use head_to_head::{compute_head_to_head, pair_detail};
pub use history::player_history;
pub use insights::{generate_insights, generate_insights_with_rng};
pub use ranking::compute_elo;
pub use standings::compute_standings;
pub use summary::compute_summaries;
pub use trends::compute_trends;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn load(source: &Source) -> Result<League> {
    match (&source.league, &source.csv_players, &source.csv_matches) {
        (Some(path), _, _) => data_loader::load_league(path)
            .with_context(|| format!("Failed to load league from {}", path.display())),
        (None, Some(players), Some(matches)) => data_loader::load_league_csv(players, matches)
            .with_context(|| format!("Failed to load league from {} and {}", players.display(), matches.display())),
        _ => anyhow::bail!("No league source given"),
    }
}

// Loads, filters by season and surface, recomputes from scratch, then renders. Nothing survives between calls.
pub fn execute(cli: &Cli) -> Result<String> {
    let mut league = load(&cli.source)?;
    if let Some(season) = &cli.season {
        league = league.season(season);
        info!("Season {}: {} matches", season, league.matches.len());
    }
    if let Some(surface) = cli.surface {
        league = league.surface(surface);
        info!("{} surface: {} matches", surface, league.matches.len());
    }

    let ranking_context = match &cli.command {
        Command::Trends { window: Some(window) } => RankingContext::default().with_trend_window(*window),
        _ => RankingContext::default(),
    };

    handle_command(&cli.command, &league, &ranking_context, cli.format)
}

pub fn handle_command(command: &Command, league: &League, ranking_context: &RankingContext, format: Format) -> Result<String> {
    let League { players, matches } = league;

    match command {
        Command::Standings => {
            let standings = compute_standings(players, matches, ranking_context);
            let trends = compute_trends(players, matches, ranking_context);
            render(format, &standings, || report::standings_report(&standings, &trends))
        }
        Command::Elo => {
            let replay = compute_elo(players, matches, ranking_context);
            let deltas = replay.deltas_in_order(matches);
            render(format, &deltas, || report::elo_report(&deltas, matches, players))
        }
        Command::H2h { pair: Some(pair) } => {
            let (a, b) = match pair.as_slice() {
                [a, b] => (a, b),
                _ => anyhow::bail!("--pair takes exactly two player ids"),
            };
            league.player(a)?;
            league.player(b)?;

            let detail = pair_detail(a, b, matches, ranking_context);
            render(format, &detail, || report::pair_report(&detail, players))
        }
        Command::H2h { pair: None } => {
            let matrix = compute_head_to_head(players, matches);
            render(format, &matrix, || report::head_to_head_report(&matrix, players))
        }
        Command::Trends { .. } => {
            let trends = compute_trends(players, matches, ranking_context);
            render(format, &trends, || report::trends_report(&trends, players))
        }
        Command::Summary => {
            let summaries = compute_summaries(players, matches);
            render(format, &summaries, || report::summary_report(&summaries, players))
        }
        Command::History { player } => {
            let player = league.player(player)?;
            let points = player_history(&player.id, matches, ranking_context);
            render(format, &points, || report::history_report(player, &points))
        }
        Command::Insights { seed } => {
            let insights = match seed {
                Some(seed) => generate_insights_with_rng(players, matches, ranking_context, &mut StdRng::seed_from_u64(*seed)),
                None => generate_insights(players, matches, ranking_context),
            };
            render(format, &insights, || report::insights_report(&insights))
        }
    }
}

fn render<T: Serialize + ?Sized>(format: Format, value: &T, table: impl FnOnce() -> String) -> Result<String> {
    match format {
        Format::Table => Ok(table()),
        Format::Json => serde_json::to_string_pretty(value).context("Failed to serialize output"),
    }
}
