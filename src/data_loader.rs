use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use log::info;
use serde::*;
use serde_aux::field_attributes::deserialize_string_from_number;

use crate::error::{LeagueError, Result};

pub type PlayerId = String;
pub type MatchId = String;

// Loads a league from a JSON file of the form { "players": [...], "matches": [...] }.
// Everything is validated on the way in, so the computations downstream never see
// negative game counts, blank ids or a player facing themself.
pub fn load_league(file_path: &Path) -> Result<League> {
    let data = fs::read_to_string(file_path)?;
    let league = League::from_json_str(&data)?;

    info!("Loaded {} players and {} matches from {}",
        league.players.len(),
        league.matches.len(),
        file_path.display(),
    );

    Ok(league)
}

// Same as load_league, but from two flat CSV files with a header row each.
pub fn load_league_csv(players_path: &Path, matches_path: &Path) -> Result<League> {
    let league = League::from_csv_readers(
        fs::File::open(players_path)?,
        fs::File::open(matches_path)?,
    )?;

    info!("Loaded {} players from {} and {} matches from {}",
        league.players.len(),
        players_path.display(),
        league.matches.len(),
        matches_path.display(),
    );

    Ok(league)
}

pub fn filter_season(matches: &[Match], season_id: &str) -> Vec<Match> {
    matches.iter()
        .filter(|m| m.season_id.as_deref() == Some(season_id))
        .cloned()
        .collect()
}

pub fn filter_surface(matches: &[Match], surface: Surface) -> Vec<Match> {
    matches.iter()
        .filter(|m| m.surface == Some(surface))
        .cloned()
        .collect()
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct League {
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
}

impl League {
    pub fn from_json_str(data: &str) -> Result<Self> {
        let json_league: JsonLeague = serde_json::from_str(data)?;
        Self::from_parts(json_league.players, json_league.matches)
    }

    pub fn from_csv_readers<P: Read, M: Read>(players: P, matches: M) -> Result<Self> {
        let json_players = csv::Reader::from_reader(players)
            .deserialize()
            .collect::<std::result::Result<Vec<JsonPlayer>, _>>()?;
        let json_matches = csv::Reader::from_reader(matches)
            .deserialize()
            .collect::<std::result::Result<Vec<JsonMatch>, _>>()?;

        Self::from_parts(json_players, json_matches)
    }

    pub fn from_parts(json_players: Vec<JsonPlayer>, json_matches: Vec<JsonMatch>) -> Result<Self> {
        let mut player_ids = HashSet::new();
        let mut players = Vec::with_capacity(json_players.len());
        for p in json_players {
            let player = Player::try_from(p)?;
            if !player_ids.insert(player.id.clone()) {
                return Err(LeagueError::DuplicateId { kind: "player", id: player.id });
            }
            players.push(player);
        }

        let mut match_ids = HashSet::new();
        let mut matches = Vec::with_capacity(json_matches.len());
        for m in json_matches {
            let m = Match::try_from(m)?;
            if !match_ids.insert(m.id.clone()) {
                return Err(LeagueError::DuplicateId { kind: "match", id: m.id });
            }
            matches.push(m);
        }

        Ok(Self { players, matches })
    }

    pub fn player(&self, id: &str) -> Result<&Player> {
        self.players.iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LeagueError::UnknownPlayer { id: id.to_string() })
    }

    pub fn season(&self, season_id: &str) -> League {
        League {
            players: self.players.clone(),
            matches: filter_season(&self.matches, season_id),
        }
    }

    pub fn surface(&self, surface: Surface) -> League {
        League {
            players: self.players.clone(),
            matches: filter_surface(&self.matches, surface),
        }
    }
}

#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Hard,
    Clay,
    Grass,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Surface::Hard => "Hard",
            Surface::Clay => "Clay",
            Surface::Grass => "Grass",
        })
    }
}

// Result of a match from one player's point of view
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn from_games(games_for: u32, games_against: u32) -> Self {
        if games_for > games_against {
            Outcome::Win
        } else if games_for < games_against {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }

    pub fn code(&self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Loss => 'L',
            Outcome::Draw => 'D',
        }
    }

    // Actual score fed to the Elo update
    pub fn score(&self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            created_at: DateTime::<Utc>::default(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub date: NaiveDate,
    #[serde(rename = "playerAId")]
    pub player_a: PlayerId,
    #[serde(rename = "playerBId")]
    pub player_b: PlayerId,
    pub games_a: u32,
    pub games_b: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<Surface>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn new(id: &str, date: NaiveDate, player_a: &str, player_b: &str, games_a: u32, games_b: u32) -> Self {
        Self {
            id: id.to_string(),
            date,
            player_a: player_a.to_string(),
            player_b: player_b.to_string(),
            games_a,
            games_b,
            surface: None,
            season_id: None,
            created_at: DateTime::<Utc>::default(),
        }
    }

    pub fn on_surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn in_season(mut self, season_id: &str) -> Self {
        self.season_id = Some(season_id.to_string());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn involves(&self, id: &str) -> bool {
        self.player_a == id || self.player_b == id
    }

    pub fn other_player(&self, id: &str) -> &PlayerId {
        debug_assert!(self.involves(id));

        if self.player_a == id { &self.player_b } else { &self.player_a }
    }

    // (games for, games against) from the given player's side of the net
    pub fn games_for(&self, id: &str) -> (u32, u32) {
        debug_assert!(self.involves(id));

        if self.player_a == id { (self.games_a, self.games_b) } else { (self.games_b, self.games_a) }
    }

    pub fn outcome_for(&self, id: &str) -> Outcome {
        let (gf, ga) = self.games_for(id);
        Outcome::from_games(gf, ga)
    }

    pub fn outcome_a(&self) -> Outcome {
        Outcome::from_games(self.games_a, self.games_b)
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        match self.outcome_a() {
            Outcome::Win => Some(&self.player_a),
            Outcome::Loss => Some(&self.player_b),
            Outcome::Draw => None,
        }
    }

    pub fn margin(&self) -> u32 {
        self.games_a.abs_diff(self.games_b)
    }
}

// Raw shapes as they appear in league files. Game counts are signed here so that a
// negative count is reported as a validation error instead of a parse failure.
#[derive(Deserialize, Debug)]
struct JsonLeague {
    #[serde(default)]
    players: Vec<JsonPlayer>,
    #[serde(default)]
    matches: Vec<JsonMatch>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JsonPlayer {
    #[serde(deserialize_with = "deserialize_string_from_number")]
    pub id: String,
    pub name: String,
    #[serde(rename(deserialize = "createdAt"), default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JsonMatch {
    #[serde(deserialize_with = "deserialize_string_from_number")]
    pub id: String,
    pub date: String,
    #[serde(deserialize_with = "deserialize_string_from_number")]
    #[serde(rename(deserialize = "playerAId"))]
    pub player_a: String,
    #[serde(deserialize_with = "deserialize_string_from_number")]
    #[serde(rename(deserialize = "playerBId"))]
    pub player_b: String,
    #[serde(rename(deserialize = "gamesA"))]
    pub games_a: i64,
    #[serde(rename(deserialize = "gamesB"))]
    pub games_b: i64,
    #[serde(default)]
    pub surface: Option<Surface>,
    #[serde(rename(deserialize = "seasonId"), default)]
    pub season_id: Option<String>,
    #[serde(rename(deserialize = "createdAt"), default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<JsonPlayer> for Player {
    type Error = LeagueError;

    fn try_from(p: JsonPlayer) -> Result<Self> {
        if p.id.trim().is_empty() {
            return Err(LeagueError::BlankId { kind: "player" });
        }
        if p.name.trim().is_empty() {
            return Err(LeagueError::BlankName { id: p.id });
        }

        Ok(Self {
            id: p.id,
            name: p.name.trim().to_string(),
            created_at: p.created_at.unwrap_or_default(),
        })
    }
}

impl TryFrom<JsonMatch> for Match {
    type Error = LeagueError;

    fn try_from(m: JsonMatch) -> Result<Self> {
        if m.id.trim().is_empty() {
            return Err(LeagueError::BlankId { kind: "match" });
        }
        if m.player_a.trim().is_empty() || m.player_b.trim().is_empty() {
            return Err(LeagueError::BlankId { kind: "player" });
        }
        if m.player_a == m.player_b {
            return Err(LeagueError::SelfMatch { match_id: m.id, player_id: m.player_a });
        }

        let (games_a, games_b) = match (u32::try_from(m.games_a), u32::try_from(m.games_b)) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return Err(LeagueError::InvalidGames { match_id: m.id, games_a: m.games_a, games_b: m.games_b }),
        };

        let date = match NaiveDate::parse_from_str(m.date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(source) => return Err(LeagueError::InvalidDate { match_id: m.id, value: m.date, source }),
        };

        Ok(Self {
            id: m.id,
            date,
            player_a: m.player_a,
            player_b: m.player_b,
            games_a,
            games_b,
            surface: m.surface,
            season_id: m.season_id.filter(|s| !s.trim().is_empty()),
            created_at: m.created_at.unwrap_or_default(),
        })
    }
}
