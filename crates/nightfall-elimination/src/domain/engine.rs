//! Eliminations and their consequences.
//!
//! The engine keeps an append-only log with at most one elimination per
//! player. After every elimination it runs a fixed table of cascade rules;
//! the only rule today turns a wild child into a lone wolf when its master
//! dies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nightfall_core::error::DomainError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::camps::{Camp, CampChoices, is_wolf_role};
use super::roster::Roster;

/// Role a wild child takes when its master dies.
pub const LONE_WOLF_ROLE: &str = "Loup solitaire";

/// Who caused an elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EliminationSource {
    /// The moderator.
    Admin,
    /// The village's day vote.
    Vote,
    /// The wolves' night attack.
    NightKill,
    /// A role's power (witch, hunter).
    SpecialPower,
    /// Anything else.
    Other,
}

/// Why a player was eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EliminationReason {
    /// Voted out.
    Vote,
    /// Attacked.
    Attack,
    /// Struck by a power.
    Power,
    /// Removed by the moderator.
    Admin,
    /// Anything else.
    Other,
}

/// One entry of the elimination log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elimination {
    /// The eliminated player.
    pub player_id: String,
    /// Who caused it.
    pub source: EliminationSource,
    /// Why.
    pub reason: EliminationReason,
    /// When it was recorded.
    pub timestamp: DateTime<Utc>,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A wild child bound to a master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    /// The bound player.
    pub subject_id: String,
    /// The player whose death triggers the switch.
    pub master_id: Option<String>,
    /// Set once, when the master is eliminated.
    pub switched: bool,
    /// Role the subject takes on switching.
    pub switched_role: String,
}

/// A role change caused by an elimination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSwitch {
    /// The player whose role changed.
    pub player_id: String,
    /// Role before the switch.
    pub previous_role: String,
    /// Role after the switch.
    pub new_role: String,
}

/// What `eliminate` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminationOutcome {
    /// The appended log entry.
    pub elimination: Elimination,
    /// Role changes triggered by it.
    pub role_switches: Vec<RoleSwitch>,
}

/// Consequences evaluated after every elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeRule {
    /// Bound subjects of the eliminated master switch role.
    MasterDeath,
}

impl CascadeRule {
    fn apply(
        self,
        eliminated_id: &str,
        bindings: &mut BTreeMap<String, RoleBinding>,
        roster: &mut Roster,
    ) -> Vec<RoleSwitch> {
        match self {
            Self::MasterDeath => {
                let mut switches = Vec::new();
                for binding in bindings.values_mut().filter(|b| {
                    !b.switched && b.master_id.as_deref() == Some(eliminated_id)
                }) {
                    binding.switched = true;
                    let Ok(subject) = roster.require_mut(&binding.subject_id) else {
                        warn!(subject_id = %binding.subject_id, "bound subject left the roster");
                        continue;
                    };
                    let previous_role =
                        std::mem::replace(&mut subject.role, binding.switched_role.clone());
                    info!(
                        subject_id = %binding.subject_id,
                        master_id = eliminated_id,
                        new_role = %binding.switched_role,
                        "master eliminated; subject switched role"
                    );
                    switches.push(RoleSwitch {
                        player_id: binding.subject_id.clone(),
                        previous_role,
                        new_role: binding.switched_role.clone(),
                    });
                }
                switches
            }
        }
    }
}

/// Records eliminations and applies their consequences.
#[derive(Debug, Clone)]
pub struct EliminationEngine {
    eliminations: Vec<Elimination>,
    bindings: BTreeMap<String, RoleBinding>,
    camp_choices: CampChoices,
    rules: Vec<CascadeRule>,
}

impl Default for EliminationEngine {
    fn default() -> Self {
        Self {
            eliminations: Vec::new(),
            bindings: BTreeMap::new(),
            camp_choices: CampChoices::default(),
            rules: vec![CascadeRule::MasterDeath],
        }
    }
}

impl EliminationEngine {
    /// Creates an engine with the standard cascade rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The elimination log, oldest first.
    #[must_use]
    pub fn eliminations(&self) -> &[Elimination] {
        &self.eliminations
    }

    /// The active elimination of `player_id`, if any.
    #[must_use]
    pub fn elimination_of(&self, player_id: &str) -> Option<&Elimination> {
        self.eliminations.iter().find(|e| e.player_id == player_id)
    }

    /// Role bindings keyed by subject.
    #[must_use]
    pub fn bindings(&self) -> &BTreeMap<String, RoleBinding> {
        &self.bindings
    }

    /// Wolf-dog camp choices.
    #[must_use]
    pub fn camp_choices(&self) -> &BTreeMap<String, Camp> {
        self.camp_choices.all()
    }

    /// Eliminates `player_id`, flips it dead and runs the cascade rules.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player and
    /// `DomainError::AlreadyEliminated` if the player already has an
    /// elimination. Neither changes the log.
    pub fn eliminate(
        &mut self,
        roster: &mut Roster,
        player_id: &str,
        source: EliminationSource,
        reason: EliminationReason,
        details: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<EliminationOutcome, DomainError> {
        roster.require(player_id)?;
        if self.elimination_of(player_id).is_some() {
            warn!(player_id, "player already eliminated");
            return Err(DomainError::AlreadyEliminated(player_id.to_owned()));
        }

        let elimination = Elimination {
            player_id: player_id.to_owned(),
            source,
            reason,
            timestamp: at,
            details,
        };
        self.eliminations.push(elimination.clone());
        roster.require_mut(player_id)?.alive = false;
        info!(player_id, ?source, ?reason, "player eliminated");

        let mut role_switches = Vec::new();
        for rule in &self.rules {
            role_switches.extend(rule.apply(player_id, &mut self.bindings, roster));
        }

        Ok(EliminationOutcome {
            elimination,
            role_switches,
        })
    }

    /// Removes `player_id`'s elimination and flips it alive. Role switches
    /// already triggered stay in place.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player.
    pub fn resurrect(&mut self, roster: &mut Roster, player_id: &str) -> Result<(), DomainError> {
        roster.require_mut(player_id)?.alive = true;
        self.eliminations.retain(|e| e.player_id != player_id);
        info!(player_id, "player resurrected");
        Ok(())
    }

    /// Clears the elimination log. Bindings and camp choices are kept.
    pub fn reset(&mut self) {
        self.eliminations.clear();
    }

    /// Binds `subject_id` to `master_id`, replacing an earlier binding that
    /// has not switched yet.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` if either player is unknown and
    /// `DomainError::Validation` if they are the same player, the master is
    /// already eliminated, or the subject has already switched.
    pub fn bind(
        &mut self,
        roster: &Roster,
        subject_id: &str,
        master_id: &str,
    ) -> Result<&RoleBinding, DomainError> {
        roster.require(subject_id)?;
        let master = roster.require(master_id)?;
        if subject_id == master_id {
            return Err(DomainError::Validation(
                "a player cannot be their own master".to_owned(),
            ));
        }
        if !master.alive {
            return Err(DomainError::Validation(format!(
                "{master_id} is already eliminated"
            )));
        }
        if self.bindings.get(subject_id).is_some_and(|b| b.switched) {
            return Err(DomainError::Validation(format!(
                "{subject_id} has already switched"
            )));
        }

        let binding = RoleBinding {
            subject_id: subject_id.to_owned(),
            master_id: Some(master_id.to_owned()),
            switched: false,
            switched_role: LONE_WOLF_ROLE.to_owned(),
        };
        info!(subject_id, master_id, "master chosen");
        let slot = self
            .bindings
            .entry(subject_id.to_owned())
            .and_modify(|existing| *existing = binding.clone())
            .or_insert(binding);
        Ok(&*slot)
    }

    /// Forgets every binding.
    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }

    /// Records a wolf-dog's one-time camp choice.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player and
    /// `DomainError::Validation` if the player already chose.
    pub fn choose_camp(
        &mut self,
        roster: &Roster,
        player_id: &str,
        camp: Camp,
    ) -> Result<(), DomainError> {
        roster.require(player_id)?;
        self.camp_choices.choose(player_id, camp)?;
        info!(player_id, ?camp, "camp chosen");
        Ok(())
    }

    /// Forgets every camp choice.
    pub fn clear_camp_choices(&mut self) {
        self.camp_choices.clear();
    }

    /// The camp `player_id` currently plays for.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player.
    pub fn camp_of(&self, roster: &Roster, player_id: &str) -> Result<Camp, DomainError> {
        let player = roster.require(player_id)?;
        let switched = self.bindings.get(player_id).is_some_and(|b| b.switched);
        let chose_wolves = self.camp_choices.choice_of(player_id) == Some(Camp::Wolves);

        if is_wolf_role(&player.role) || switched || chose_wolves {
            Ok(Camp::Wolves)
        } else {
            Ok(Camp::Village)
        }
    }

    /// Whether `player_id` is a switched wild child.
    #[must_use]
    pub fn has_switched(&self, player_id: &str) -> bool {
        self.bindings.get(player_id).is_some_and(|b| b.switched)
    }

    /// The log grouped by source.
    #[must_use]
    pub fn by_source(&self) -> BTreeMap<EliminationSource, Vec<&Elimination>> {
        let mut grouped: BTreeMap<EliminationSource, Vec<&Elimination>> = BTreeMap::new();
        for elimination in &self.eliminations {
            grouped.entry(elimination.source).or_default().push(elimination);
        }
        grouped
    }

    /// The log grouped by reason.
    #[must_use]
    pub fn by_reason(&self) -> BTreeMap<EliminationReason, Vec<&Elimination>> {
        let mut grouped: BTreeMap<EliminationReason, Vec<&Elimination>> = BTreeMap::new();
        for elimination in &self.eliminations {
            grouped.entry(elimination.reason).or_default().push(elimination);
        }
        grouped
    }
}
