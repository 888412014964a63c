//! Domain events for the game session.
//!
//! One event per accepted command. Events are published, never replayed, so
//! payloads only need to serialize.

use nightfall_core::event::{DomainEvent, EventMetadata};
use nightfall_elimination::domain::camps::Camp;
use nightfall_elimination::domain::engine::{Elimination, RoleBinding, RoleSwitch};
use nightfall_timer::domain::scheduler::SubPhase;
use nightfall_voting::domain::ballot::BallotView;
use nightfall_voting::domain::tally::TallyResult;
use serde::Serialize;

/// Event type for [`SessionEventKind::NightStarted`].
pub const NIGHT_STARTED_EVENT_TYPE: &str = "session.night_started";
/// Event type for [`SessionEventKind::DayStarted`].
pub const DAY_STARTED_EVENT_TYPE: &str = "session.day_started";
/// Event type for [`SessionEventKind::ClockTicked`].
pub const CLOCK_TICKED_EVENT_TYPE: &str = "session.clock_ticked";
/// Event type for [`SessionEventKind::ClockCompleted`].
pub const CLOCK_COMPLETED_EVENT_TYPE: &str = "session.clock_completed";
/// Event type for [`SessionEventKind::ClockRearmed`].
pub const CLOCK_REARMED_EVENT_TYPE: &str = "session.clock_rearmed";
/// Event type for [`SessionEventKind::PhaseSkipped`].
pub const PHASE_SKIPPED_EVENT_TYPE: &str = "session.phase_skipped";
/// Event type for [`SessionEventKind::DurationChanged`].
pub const DURATION_CHANGED_EVENT_TYPE: &str = "session.duration_changed";
/// Event type for [`SessionEventKind::VoteCast`].
pub const VOTE_CAST_EVENT_TYPE: &str = "session.vote_cast";
/// Event type for [`SessionEventKind::RunoffStarted`].
pub const RUNOFF_STARTED_EVENT_TYPE: &str = "session.runoff_started";
/// Event type for [`SessionEventKind::NightVoteCast`].
pub const NIGHT_VOTE_CAST_EVENT_TYPE: &str = "session.night_vote_cast";
/// Event type for [`SessionEventKind::VictimDesignated`].
pub const VICTIM_DESIGNATED_EVENT_TYPE: &str = "session.victim_designated";
/// Event type for [`SessionEventKind::PlayerEliminated`].
pub const PLAYER_ELIMINATED_EVENT_TYPE: &str = "session.player_eliminated";
/// Event type for [`SessionEventKind::PlayerResurrected`].
pub const PLAYER_RESURRECTED_EVENT_TYPE: &str = "session.player_resurrected";
/// Event type for [`SessionEventKind::RoleBound`].
pub const ROLE_BOUND_EVENT_TYPE: &str = "session.role_bound";
/// Event type for [`SessionEventKind::CampChosen`].
pub const CAMP_CHOSEN_EVENT_TYPE: &str = "session.camp_chosen";
/// Event type for [`SessionEventKind::MayorAppointed`].
pub const MAYOR_APPOINTED_EVENT_TYPE: &str = "session.mayor_appointed";
/// Event type for [`SessionEventKind::DayReset`].
pub const DAY_RESET_EVENT_TYPE: &str = "session.day_reset";
/// Event type for [`SessionEventKind::NightReset`].
pub const NIGHT_RESET_EVENT_TYPE: &str = "session.night_reset";
/// Event type for [`SessionEventKind::SessionReset`].
pub const SESSION_RESET_EVENT_TYPE: &str = "session.session_reset";

/// Emitted when a night begins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightStarted {
    /// Night index passed by the moderator.
    pub night_number: u32,
    /// Night length in seconds.
    pub total_seconds: u32,
    /// Cycle count after the transition.
    pub cycle_count: u32,
    /// Tonight's schedule.
    pub sub_phases: Vec<SubPhase>,
}

/// Emitted when a day begins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStarted {
    /// Current cycle count.
    pub cycle_count: u32,
}

/// Emitted on every second the countdown runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockTicked {
    /// Seconds left.
    pub remaining: u32,
    /// Ids of the sub-phases running now.
    pub active_phases: Vec<String>,
}

/// Emitted when the countdown reaches zero.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockCompleted {
    /// Length of the completed run.
    pub total_seconds: u32,
}

/// Emitted when a completed countdown restarts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockRearmed {
    /// Length of the new run.
    pub total_seconds: u32,
}

/// Emitted when the moderator skips a sub-phase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSkipped {
    /// The skipped sub-phase.
    pub sub_phase_id: String,
    /// Seconds elapsed when it was skipped.
    pub elapsed: u32,
    /// The schedule after reallocation.
    pub sub_phases: Vec<SubPhase>,
}

/// Emitted when the night's length changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationChanged {
    /// Length before the change.
    pub previous_total_seconds: u32,
    /// Length after the change.
    pub total_seconds: u32,
    /// Seconds left after the change.
    pub remaining: u32,
    /// The schedule after reallocation.
    pub sub_phases: Vec<SubPhase>,
}

/// Emitted when a day vote is recorded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCast {
    /// The voter.
    pub voter_id: String,
    /// The chosen target.
    pub target_id: String,
    /// The count after the vote.
    pub tally: TallyResult,
}

/// Emitted when a runoff round opens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunoffStarted {
    /// Players who may receive votes.
    pub candidates: Vec<String>,
}

/// Emitted when a wolf records its choice.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightVoteCast {
    /// The wolf.
    pub wolf_id: String,
    /// Its chosen victim.
    pub victim_id: String,
    /// The ballot after the vote.
    pub ballot: BallotView,
}

/// Emitted when the moderator settles the wolves' victim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VictimDesignated {
    /// The victim, or `None` when cleared.
    pub victim_id: Option<String>,
}

/// Emitted when a player is eliminated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEliminated {
    /// The log entry.
    pub elimination: Elimination,
    /// Role changes it caused.
    pub role_switches: Vec<RoleSwitch>,
}

/// Emitted when a player comes back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResurrected {
    /// The player.
    pub player_id: String,
}

/// Emitted when a wild child chooses a master.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBound {
    /// The new binding.
    pub binding: RoleBinding,
}

/// Emitted when a wolf-dog picks a side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampChosen {
    /// The player.
    pub player_id: String,
    /// The chosen camp.
    pub camp: Camp,
}

/// Emitted when the mayor's sash changes hands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MayorAppointed {
    /// The new mayor.
    pub player_id: String,
}

/// Emitted when the whole game is reset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReset {
    /// Players seated after the reset.
    pub player_count: usize,
}

/// Event payload variants for the game session.
#[derive(Debug, Clone, Serialize)]
pub enum SessionEventKind {
    /// A night has started.
    NightStarted(NightStarted),
    /// A day has started.
    DayStarted(DayStarted),
    /// One second elapsed.
    ClockTicked(ClockTicked),
    /// The countdown reached zero.
    ClockCompleted(ClockCompleted),
    /// The countdown restarted.
    ClockRearmed(ClockRearmed),
    /// A sub-phase was skipped.
    PhaseSkipped(PhaseSkipped),
    /// The night's length changed.
    DurationChanged(DurationChanged),
    /// A day vote was recorded.
    VoteCast(VoteCast),
    /// A runoff opened.
    RunoffStarted(RunoffStarted),
    /// A wolf voted.
    NightVoteCast(NightVoteCast),
    /// The wolves' victim was settled.
    VictimDesignated(VictimDesignated),
    /// A player was eliminated.
    PlayerEliminated(PlayerEliminated),
    /// A player was resurrected.
    PlayerResurrected(PlayerResurrected),
    /// A wild child chose a master.
    RoleBound(RoleBound),
    /// A wolf-dog chose a camp.
    CampChosen(CampChosen),
    /// The mayor changed.
    MayorAppointed(MayorAppointed),
    /// The day vote was cleared.
    DayReset,
    /// The night state was cleared.
    NightReset,
    /// The whole game was reset.
    SessionReset(SessionReset),
}

impl SessionEventKind {
    /// The routing name of this variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NightStarted(_) => NIGHT_STARTED_EVENT_TYPE,
            Self::DayStarted(_) => DAY_STARTED_EVENT_TYPE,
            Self::ClockTicked(_) => CLOCK_TICKED_EVENT_TYPE,
            Self::ClockCompleted(_) => CLOCK_COMPLETED_EVENT_TYPE,
            Self::ClockRearmed(_) => CLOCK_REARMED_EVENT_TYPE,
            Self::PhaseSkipped(_) => PHASE_SKIPPED_EVENT_TYPE,
            Self::DurationChanged(_) => DURATION_CHANGED_EVENT_TYPE,
            Self::VoteCast(_) => VOTE_CAST_EVENT_TYPE,
            Self::RunoffStarted(_) => RUNOFF_STARTED_EVENT_TYPE,
            Self::NightVoteCast(_) => NIGHT_VOTE_CAST_EVENT_TYPE,
            Self::VictimDesignated(_) => VICTIM_DESIGNATED_EVENT_TYPE,
            Self::PlayerEliminated(_) => PLAYER_ELIMINATED_EVENT_TYPE,
            Self::PlayerResurrected(_) => PLAYER_RESURRECTED_EVENT_TYPE,
            Self::RoleBound(_) => ROLE_BOUND_EVENT_TYPE,
            Self::CampChosen(_) => CAMP_CHOSEN_EVENT_TYPE,
            Self::MayorAppointed(_) => MAYOR_APPOINTED_EVENT_TYPE,
            Self::DayReset => DAY_RESET_EVENT_TYPE,
            Self::NightReset => NIGHT_RESET_EVENT_TYPE,
            Self::SessionReset(_) => SESSION_RESET_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the game session.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
