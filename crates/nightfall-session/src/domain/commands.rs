//! Commands for the game session.

use nightfall_core::command::Command;
use nightfall_elimination::domain::camps::Camp;
use nightfall_elimination::domain::engine::{EliminationReason, EliminationSource};
use uuid::Uuid;

/// Command to begin a night.
#[derive(Debug, Clone)]
pub struct StartNight {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Night length in seconds.
    pub total_seconds: u32,
    /// 1-based night index; selects odd-night sub-phases.
    pub night_number: u32,
}

/// Command to begin a day.
#[derive(Debug, Clone)]
pub struct StartDay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

/// Command issued by the tick driver once per second.
#[derive(Debug, Clone)]
pub struct Tick {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

/// Command to restart a completed countdown.
#[derive(Debug, Clone)]
pub struct RearmClock {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

/// Command to end a running sub-phase early.
#[derive(Debug, Clone)]
pub struct SkipPhase {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The sub-phase to skip.
    pub sub_phase_id: String,
}

/// Command to change the night's length.
#[derive(Debug, Clone)]
pub struct ChangeDuration {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// New length in seconds.
    pub total_seconds: u32,
}

/// Command to record a day vote.
#[derive(Debug, Clone)]
pub struct CastVote {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The voter.
    pub voter_id: String,
    /// The target.
    pub target_id: String,
}

/// Command to open a runoff round.
#[derive(Debug, Clone)]
pub struct StartRunoff {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Players who may receive votes.
    pub candidates: Vec<String>,
}

/// Command to record a wolf's night vote.
#[derive(Debug, Clone)]
pub struct CastNightVote {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wolf.
    pub wolf_id: String,
    /// Its chosen victim.
    pub victim_id: String,
}

/// Command to settle the wolves' victim.
#[derive(Debug, Clone)]
pub struct DesignateVictim {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The victim, or `None` to clear it.
    pub victim_id: Option<String>,
}

/// Command to eliminate a player.
#[derive(Debug, Clone)]
pub struct EliminatePlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub player_id: String,
    /// Who caused it.
    pub source: EliminationSource,
    /// Why.
    pub reason: EliminationReason,
    /// Free-form note.
    pub details: Option<String>,
}

/// Command to bring a player back.
#[derive(Debug, Clone)]
pub struct ResurrectPlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub player_id: String,
}

/// Command to bind a wild child to its master.
#[derive(Debug, Clone)]
pub struct BindRole {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wild child.
    pub subject_id: String,
    /// The chosen master.
    pub master_id: String,
}

/// Command to record a wolf-dog's camp.
#[derive(Debug, Clone)]
pub struct ChooseCamp {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The wolf-dog.
    pub player_id: String,
    /// The chosen camp.
    pub camp: Camp,
}

/// Command to hand over the mayor's sash.
#[derive(Debug, Clone)]
pub struct AppointMayor {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new mayor.
    pub player_id: String,
}

/// Command to clear the day vote.
#[derive(Debug, Clone)]
pub struct ResetDay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

/// Command to clear the night state.
#[derive(Debug, Clone)]
pub struct ResetNight {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

/// Command to reset the whole game with a fresh roster.
#[derive(Debug, Clone)]
pub struct ResetSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

macro_rules! impl_command {
    ($($ty:ident => $name:literal),* $(,)?) => {
        $(
            impl Command for $ty {
                fn command_type(&self) -> &'static str {
                    $name
                }

                fn correlation_id(&self) -> Uuid {
                    self.correlation_id
                }
            }
        )*
    };
}

impl_command! {
    StartNight => "session.start_night",
    StartDay => "session.start_day",
    Tick => "session.tick",
    RearmClock => "session.rearm_clock",
    SkipPhase => "session.skip_phase",
    ChangeDuration => "session.change_duration",
    CastVote => "session.cast_vote",
    StartRunoff => "session.start_runoff",
    CastNightVote => "session.cast_night_vote",
    DesignateVictim => "session.designate_victim",
    EliminatePlayer => "session.eliminate_player",
    ResurrectPlayer => "session.resurrect_player",
    BindRole => "session.bind_role",
    ChooseCamp => "session.choose_camp",
    AppointMayor => "session.appoint_mayor",
    ResetDay => "session.reset_day",
    ResetNight => "session.reset_night",
    ResetSession => "session.reset_session",
}
