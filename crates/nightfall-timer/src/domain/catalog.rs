//! The night phase catalog.
//!
//! A catalog lists every sub-phase a night can contain, with its share of the
//! night, its priority slot and the roles it serves. Loading a catalog for a
//! given night keeps only the definitions active on that night.

use serde::{Deserialize, Serialize};

/// Identifier of the wolves' shared sub-phase.
pub const WOLVES_PHASE_ID: &str = "wolves";

/// How a sub-phase occupies time inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseSpan {
    /// Occupies the group's window, shared with the other window members.
    Window,
    /// Spans the entire night regardless of its group.
    FullNight,
}

/// Which nights a sub-phase takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Activation {
    /// Every night.
    EveryNight,
    /// Nights 1, 3, 5, ...
    OddNights,
}

impl Activation {
    /// Whether the sub-phase runs on `night_number` (1-based).
    #[must_use]
    pub fn is_active_on(self, night_number: u32) -> bool {
        match self {
            Self::EveryNight => true,
            Self::OddNights => night_number % 2 == 1,
        }
    }
}

/// Static description of a sub-phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDefinition {
    /// Stable identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Share of the night, in percent.
    pub share_percent: u32,
    /// Priority slot; lower runs earlier.
    pub order: u32,
    /// Window or full-night.
    pub span: PhaseSpan,
    /// Nights on which the sub-phase runs.
    pub activation: Activation,
    /// Role names served by the sub-phase.
    pub roles: Vec<String>,
}

impl PhaseDefinition {
    /// A sub-phase occupying its group's window.
    #[must_use]
    pub fn window(id: &str, label: &str, share_percent: u32, order: u32) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            share_percent,
            order,
            span: PhaseSpan::Window,
            activation: Activation::EveryNight,
            roles: Vec::new(),
        }
    }

    /// A sub-phase spanning the whole night.
    #[must_use]
    pub fn full_night(id: &str, label: &str, order: u32) -> Self {
        Self {
            span: PhaseSpan::FullNight,
            ..Self::window(id, label, 100, order)
        }
    }

    /// Sets the roles served by this sub-phase.
    #[must_use]
    pub fn serving(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| (*r).to_owned()).collect();
        self
    }

    /// Restricts the nights on which this sub-phase runs.
    #[must_use]
    pub fn on(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }
}

/// The standard night: the seer watches all night, the wolves hunt in the
/// first half, the special wolves share the third quarter and the witch
/// closes the night.
#[must_use]
pub fn default_catalog() -> Vec<PhaseDefinition> {
    vec![
        PhaseDefinition::full_night("seer", "Voyante", 1).serving(&["voyante"]),
        PhaseDefinition::window(WOLVES_PHASE_ID, "Loups-Garous", 50, 1).serving(&[
            "loup-garou",
            "loup garou",
            "loup",
            "loup solitaire",
            "chien-loup",
            "chien loup",
        ]),
        PhaseDefinition::window("infect-father", "Infect Père des Loups", 25, 2).serving(&[
            "infect père des loups",
            "infect pere des loups",
            "infect-pere-des-loups",
        ]),
        PhaseDefinition::window("big-bad-wolf", "Grand Méchant Loup", 25, 2).serving(&[
            "grand méchant loup",
            "grand mechant loup",
            "grand-mechant-loup",
        ]),
        PhaseDefinition::window("white-wolf", "Loup Blanc", 25, 2)
            .serving(&["loup blanc", "loup-blanc"])
            .on(Activation::OddNights),
        PhaseDefinition::window("witch", "Sorcière", 25, 4).serving(&["sorcière", "sorciere"]),
    ]
}

fn normalize(role: &str) -> String {
    role.trim().to_lowercase()
}

/// Loose role comparison: case-insensitive and tolerant of one name being a
/// longer spelling of the other ("Loup" matches "Loup-Garou").
#[must_use]
pub fn role_matches(pattern: &str, role: &str) -> bool {
    let pattern = normalize(pattern);
    let role = normalize(role);
    if pattern.is_empty() || role.is_empty() {
        return false;
    }
    pattern == role || role.contains(&pattern) || pattern.contains(&role)
}
