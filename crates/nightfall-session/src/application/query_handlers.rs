//! Query handlers for the game session.
//!
//! This module builds read-only views of the session for the adapter and
//! for clients joining mid-game.

use std::collections::BTreeMap;

use nightfall_core::aggregate::AggregateRoot;
use nightfall_elimination::domain::camps::Camp;
use nightfall_elimination::domain::engine::{
    Elimination, EliminationReason, EliminationSource, RoleBinding,
};
use nightfall_timer::domain::countdown::Countdown;
use nightfall_timer::domain::scheduler::SubPhase;
use nightfall_voting::domain::ballot::BallotView;
use nightfall_voting::domain::tally::TallyResult;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{GameSession, SessionState};

/// A seated player as the moderator sees them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Player identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the player is still in the game.
    pub alive: bool,
    /// Current role.
    pub role: String,
    /// Whether the player holds the mayor's sash.
    pub is_mayor: bool,
    /// The camp the player plays for.
    pub camp: Camp,
    /// The sub-phase the player wakes up in tonight, if any.
    pub night_phase: Option<String>,
}

/// Read-only view of the whole session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// The session identifier.
    pub session_id: Uuid,
    /// Current version (events published).
    pub version: i64,
    /// Phase, cycle and runoff state.
    pub state: SessionState,
    /// The countdown.
    pub countdown: Countdown,
    /// Tonight's schedule.
    pub sub_phases: Vec<SubPhase>,
    /// Day votes, voter to target.
    pub votes: BTreeMap<String, String>,
    /// Current count of the day votes.
    pub tally: TallyResult,
    /// The wolves' ballot.
    pub ballot: BallotView,
    /// The elimination log.
    pub eliminations: Vec<Elimination>,
    /// The elimination log grouped by source.
    pub eliminations_by_source: BTreeMap<EliminationSource, Vec<Elimination>>,
    /// The elimination log grouped by reason.
    pub eliminations_by_reason: BTreeMap<EliminationReason, Vec<Elimination>>,
    /// Wild-child bindings.
    pub bindings: Vec<RoleBinding>,
    /// Wolf-dog camp choices.
    pub camp_choices: BTreeMap<String, Camp>,
    /// The seated players.
    pub players: Vec<PlayerView>,
}

/// Builds the snapshot of `session`.
#[must_use]
pub fn get_snapshot(session: &GameSession) -> SessionSnapshot {
    let players = session
        .roster()
        .players()
        .iter()
        .map(|player| PlayerView {
            id: player.id.clone(),
            name: player.name.clone(),
            alive: player.alive,
            role: player.role.clone(),
            is_mayor: player.is_mayor,
            camp: session.camp_of(&player.id).unwrap_or(Camp::Village),
            night_phase: session
                .night_phase_of(&player.id)
                .ok()
                .flatten()
                .map(str::to_owned),
        })
        .collect();

    SessionSnapshot {
        session_id: session.aggregate_id(),
        version: session.version(),
        state: session.state(),
        countdown: *session.countdown(),
        sub_phases: session.sub_phases().to_vec(),
        votes: session.tally().votes().clone(),
        tally: session.tally().tally(),
        ballot: session.ballot().view(),
        eliminations: session.engine().eliminations().to_vec(),
        eliminations_by_source: owned_groups(session.engine().by_source()),
        eliminations_by_reason: owned_groups(session.engine().by_reason()),
        bindings: session.engine().bindings().values().cloned().collect(),
        camp_choices: session.engine().camp_choices().clone(),
        players,
    }
}

fn owned_groups<K: Ord>(
    groups: BTreeMap<K, Vec<&Elimination>>,
) -> BTreeMap<K, Vec<Elimination>> {
    groups
        .into_iter()
        .map(|(key, eliminations)| (key, eliminations.into_iter().cloned().collect()))
        .collect()
}
