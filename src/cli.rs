use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::data_loader::Surface;

#[derive(Parser, Debug)]
#[command(author, version, about = "Tennis league ratings, standings and head-to-head records")]
pub struct Cli {
    #[clap(flatten)]
    pub source: Source,

    /// Only count matches from this season
    #[arg(short, long, global = true)]
    pub season: Option<String>,

    /// Only count matches played on this surface
    #[arg(long, value_enum, global = true)]
    pub surface: Option<Surface>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct Source {
    /// League JSON file with players and matches
    #[arg(short, long, conflicts_with_all = ["csv_players", "csv_matches"], required_unless_present = "csv_players")]
    pub league: Option<PathBuf>,

    /// Players CSV (id,name,createdAt)
    #[arg(long, requires = "csv_matches")]
    pub csv_players: Option<PathBuf>,

    /// Matches CSV (id,date,playerAId,playerBId,gamesA,gamesB,surface,seasonId,createdAt)
    #[arg(long, requires = "csv_players")]
    pub csv_matches: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// League table ranked by matches won, then Elo
    Standings,
    /// Rating change of every match in replay order
    Elo,
    /// Head-to-head matrix, or one rivalry in detail
    H2h {
        /// Show the detail for two player ids
        #[arg(long, num_args = 2, value_names = ["PLAYER_A", "PLAYER_B"])]
        pair: Option<Vec<String>>,
    },
    /// Recent form against earlier form
    Trends {
        /// Number of recent matches compared against the rest
        #[arg(short, long)]
        window: Option<usize>,
    },
    /// Best and worst opponents, average score and current streak
    Summary,
    /// Running form of one player after every match
    History {
        /// Player id
        player: String,
    },
    /// A couple of talking points about the league
    Insights {
        /// Seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,
    },
}
