use thiserror::Error;

use crate::data_loader::{MatchId, PlayerId};

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parse Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV Parse Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid date '{value}' in match {match_id}: {source}")]
    InvalidDate {
        match_id: MatchId,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Match {match_id} has an invalid game count ({games_a}-{games_b})")]
    InvalidGames {
        match_id: MatchId,
        games_a: i64,
        games_b: i64,
    },

    #[error("Blank {kind} id")]
    BlankId { kind: &'static str },

    #[error("Player {id} has a blank name")]
    BlankName { id: PlayerId },

    #[error("Match {match_id} pits player {player_id} against themself")]
    SelfMatch { match_id: MatchId, player_id: PlayerId },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Unknown player: {id}")]
    UnknownPlayer { id: PlayerId },
}

pub type Result<T> = std::result::Result<T, LeagueError>;
