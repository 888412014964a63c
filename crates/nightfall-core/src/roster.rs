//! Player roster abstraction.
//!
//! The roster is assigned outside the moderator (login, role draw). The
//! session reads it through [`RosterProvider`] when a game starts or is
//! reset, and from then on owns its own copy.

use serde::{Deserialize, Serialize};

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable player identifier (the login).
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the player is still in the game.
    #[serde(default = "default_alive")]
    pub alive: bool,
    /// Displayed role name.
    #[serde(default)]
    pub role: String,
    /// Whether the player currently holds the mayor's sash.
    #[serde(default)]
    pub is_mayor: bool,
}

fn default_alive() -> bool {
    true
}

impl Player {
    /// Creates an alive, non-mayor player.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alive: true,
            role: role.into(),
            is_mayor: false,
        }
    }
}

/// Source of the current player list.
pub trait RosterProvider: Send + Sync {
    /// Returns the players seated for the game.
    fn players(&self) -> Vec<Player>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_alive_and_not_mayor() {
        let player = Player::new("alice", "Alice", "Voyante");

        assert!(player.alive);
        assert!(!player.is_mayor);
        assert_eq!(player.role, "Voyante");
    }

    #[test]
    fn test_player_deserializes_with_defaults() {
        let player: Player = serde_json::from_str(r#"{ "id": "bob", "role": "Sorcière" }"#).unwrap();

        assert_eq!(player.id, "bob");
        assert!(player.alive);
        assert!(!player.is_mayor);
        assert!(player.name.is_empty());
    }
}
