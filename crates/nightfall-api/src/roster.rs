//! Roster provider backed by a JSON file.
//!
//! The file holds an array of players. It is read once at startup, where a
//! broken file stops the server, and again on every session reset, where a
//! broken file keeps the last good roster.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nightfall_core::roster::{Player, RosterProvider};
use tracing::{info, warn};

use crate::error::AppError;

/// Reads the seated players from a JSON file.
#[derive(Debug)]
pub struct JsonFileRoster {
    path: PathBuf,
    last_good: Mutex<Vec<Player>>,
}

impl JsonFileRoster {
    /// Loads the roster at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Roster` if the file cannot be read or is not a JSON
    /// array of players.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let players = read_players(path)?;
        info!(path = %path.display(), count = players.len(), "roster loaded");
        Ok(Self {
            path: path.to_path_buf(),
            last_good: Mutex::new(players),
        })
    }
}

impl RosterProvider for JsonFileRoster {
    fn players(&self) -> Vec<Player> {
        let mut last_good = match self.last_good.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match read_players(&self.path) {
            Ok(players) => {
                last_good.clone_from(&players);
                players
            }
            Err(err) => {
                warn!(error = %err, "roster reload failed, keeping the previous roster");
                last_good.clone()
            }
        }
    }
}

fn read_players(path: &Path) -> Result<Vec<Player>, AppError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Roster(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Roster(format!("invalid roster in {}: {e}", path.display())))
}
