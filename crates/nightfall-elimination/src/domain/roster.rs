//! The seated players.

use nightfall_core::error::DomainError;
use nightfall_core::roster::Player;
use tracing::info;

/// The players of one game. Players are never removed, only flagged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Seats `players`, keeping the first occurrence of a duplicated id.
    #[must_use]
    pub fn from_players(players: Vec<Player>) -> Self {
        let mut seated: Vec<Player> = Vec::with_capacity(players.len());
        for player in players {
            if !seated.iter().any(|p| p.id == player.id) {
                seated.push(player);
            }
        }
        Self { players: seated }
    }

    /// Every player in seating order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Players still in the game.
    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    /// Looks up a player.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Looks up a player or fails with `PlayerNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` if `id` is not seated.
    pub fn require(&self, id: &str) -> Result<&Player, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::PlayerNotFound(id.to_owned()))
    }

    pub(crate) fn require_mut(&mut self, id: &str) -> Result<&mut Player, DomainError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::PlayerNotFound(id.to_owned()))
    }

    /// The current mayor, if any.
    #[must_use]
    pub fn mayor(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_mayor)
    }

    /// Hands the mayor's sash to `id`, taking it from whoever held it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player and
    /// `DomainError::Validation` for an eliminated one.
    pub fn appoint_mayor(&mut self, id: &str) -> Result<(), DomainError> {
        if !self.require(id)?.alive {
            return Err(DomainError::Validation(format!(
                "{id} is eliminated and cannot be mayor"
            )));
        }

        for player in &mut self.players {
            player.is_mayor = player.id == id;
        }
        info!(player_id = id, "mayor appointed");
        Ok(())
    }
}
