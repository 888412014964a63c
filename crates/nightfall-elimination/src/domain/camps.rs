//! Which side a player plays for.

use std::collections::BTreeMap;

use nightfall_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The two camps of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Camp {
    /// The villagers.
    Village,
    /// The wolves.
    Wolves,
}

const WOLF_ROLES: [&str; 5] = [
    "loupgarou",
    "loupblanc",
    "grandmechantloup",
    "infectperedesloups",
    "loupsolitaire",
];

/// Lowercases, drops accents from the letters the role names use, and
/// removes spaces and hyphens: "Grand Méchant-Loup" becomes "grandmechantloup".
fn fold(role: &str) -> String {
    role.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| match c {
            'é' | 'è' | 'ê' => 'e',
            other => other,
        })
        .collect()
}

/// Whether `role` is one of the wolf roles.
#[must_use]
pub fn is_wolf_role(role: &str) -> bool {
    let folded = fold(role);
    WOLF_ROLES.iter().any(|wolf| folded.contains(wolf))
}

/// Camps chosen by wolf-dogs. Each player chooses at most once per game.
#[derive(Debug, Clone, Default)]
pub struct CampChoices {
    choices: BTreeMap<String, Camp>,
}

impl CampChoices {
    /// Records `player_id`'s choice.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the player already chose.
    pub fn choose(&mut self, player_id: &str, camp: Camp) -> Result<(), DomainError> {
        if self.choices.contains_key(player_id) {
            return Err(DomainError::Validation(format!(
                "{player_id} has already chosen a camp"
            )));
        }
        self.choices.insert(player_id.to_owned(), camp);
        Ok(())
    }

    /// The camp `player_id` chose, if any.
    #[must_use]
    pub fn choice_of(&self, player_id: &str) -> Option<Camp> {
        self.choices.get(player_id).copied()
    }

    /// Every recorded choice.
    #[must_use]
    pub fn all(&self) -> &BTreeMap<String, Camp> {
        &self.choices
    }

    /// Forgets every choice.
    pub fn clear(&mut self) {
        self.choices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wolf_roles_are_recognised_in_any_spelling() {
        assert!(is_wolf_role("Loup-Garou"));
        assert!(is_wolf_role("loup garou"));
        assert!(is_wolf_role("Loup Blanc"));
        assert!(is_wolf_role("Grand Méchant Loup"));
        assert!(is_wolf_role("grand-mechant-loup"));
        assert!(is_wolf_role("Infect Père des Loups"));
        assert!(is_wolf_role("Loup solitaire"));
    }

    #[test]
    fn test_village_roles_are_not_wolves() {
        assert!(!is_wolf_role("Voyante"));
        assert!(!is_wolf_role("Chien-Loup"));
        assert!(!is_wolf_role("Enfant sauvage"));
        assert!(!is_wolf_role(""));
    }

    #[test]
    fn test_a_camp_can_be_chosen_once() {
        // Arrange
        let mut choices = CampChoices::default();
        choices.choose("rex", Camp::Wolves).unwrap();

        // Act
        let second = choices.choose("rex", Camp::Village);

        // Assert
        assert!(matches!(second, Err(DomainError::Validation(_))));
        assert_eq!(choices.choice_of("rex"), Some(Camp::Wolves));
    }

    #[test]
    fn test_clear_allows_choosing_again() {
        let mut choices = CampChoices::default();
        choices.choose("rex", Camp::Wolves).unwrap();

        choices.clear();

        assert_eq!(choices.choice_of("rex"), None);
        choices.choose("rex", Camp::Village).unwrap();
    }
}
