//! Test rosters — fixed `RosterProvider` implementations for tests.

use std::sync::Mutex;

use nightfall_core::roster::{Player, RosterProvider};

/// A roster provider that returns a configurable list of players.
#[derive(Debug, Default)]
pub struct StaticRoster {
    players: Mutex<Vec<Player>>,
}

impl StaticRoster {
    /// Creates a provider returning `players`.
    #[must_use]
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            players: Mutex::new(players),
        }
    }

    /// Replaces the players returned by subsequent reads.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn replace(&self, players: Vec<Player>) {
        *self.players.lock().unwrap() = players;
    }
}

impl RosterProvider for StaticRoster {
    fn players(&self) -> Vec<Player> {
        self.players.lock().unwrap().clone()
    }
}

/// Builds a roster from `(id, role)` pairs, using the id as display name.
#[must_use]
pub fn village_of(seats: &[(&str, &str)]) -> Vec<Player> {
    seats
        .iter()
        .map(|(id, role)| Player::new(*id, *id, *role))
        .collect()
}
