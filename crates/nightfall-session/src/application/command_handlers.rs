//! Command handlers for the game session.
//!
//! Each handler runs one command against the in-memory session, drains the
//! event it produced and hands it to the publisher. A rejected command
//! publishes nothing.

use nightfall_core::aggregate::AggregateRoot;
use nightfall_core::clock::Clock;
use nightfall_core::command::Command;
use nightfall_core::error::DomainError;
use nightfall_core::publisher::{EventPublisher, StoredEvent};
use nightfall_core::roster::RosterProvider;
use nightfall_elimination::domain::engine::{EliminationOutcome, RoleBinding};
use nightfall_timer::domain::countdown::TickOutcome;
use nightfall_timer::domain::scheduler::SubPhase;
use nightfall_voting::domain::ballot::BallotView;
use nightfall_voting::domain::tally::TallyResult;
use serde::Serialize;
use tracing::debug;

use crate::domain::aggregates::{GameSession, SessionState};
use crate::domain::commands::{
    AppointMayor, BindRole, CastNightVote, CastVote, ChangeDuration, ChooseCamp, DesignateVictim,
    EliminatePlayer, RearmClock, ResetDay, ResetNight, ResetSession, ResurrectPlayer, SkipPhase,
    StartDay, StartNight, StartRunoff, Tick,
};

/// Countdown and schedule after a night-shaping command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightView {
    /// Configured length in seconds.
    pub total_seconds: u32,
    /// Seconds left.
    pub remaining: u32,
    /// Whether the countdown is ticking.
    pub running: bool,
    /// Tonight's schedule.
    pub sub_phases: Vec<SubPhase>,
}

fn night_view(session: &GameSession, sub_phases: Vec<SubPhase>) -> NightView {
    let countdown = session.countdown();
    NightView {
        total_seconds: countdown.total(),
        remaining: countdown.remaining(),
        running: countdown.is_running(),
        sub_phases,
    }
}

fn publish_uncommitted(
    session: &mut GameSession,
    command: &dyn Command,
    publisher: &dyn EventPublisher,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events: Vec<StoredEvent> = session
        .take_uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();
    debug!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        count = stored_events.len(),
        "publishing session events"
    );
    publisher.publish(&stored_events)?;
    Ok(stored_events)
}

/// Handles the `StartNight` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a zero length or night number, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_start_night(
    command: &StartNight,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<NightView, DomainError> {
    session.start_night(
        command.correlation_id,
        clock,
        command.total_seconds,
        command.night_number,
    )?;
    publish_uncommitted(session, command, publisher)?;
    Ok(night_view(session, session.sub_phases().to_vec()))
}

/// Handles the `StartDay` command.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if publishing fails.
pub fn handle_start_day(
    command: &StartDay,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<SessionState, DomainError> {
    session.start_day(command.correlation_id, clock);
    publish_uncommitted(session, command, publisher)?;
    Ok(session.state())
}

/// Handles the `Tick` command issued by the tick driver.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if publishing fails.
pub fn handle_tick(
    command: &Tick,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<TickOutcome, DomainError> {
    let outcome = session.tick(command.correlation_id, clock);
    if outcome != TickOutcome::Idle {
        publish_uncommitted(session, command, publisher)?;
    }
    Ok(outcome)
}

/// Handles the `RearmClock` command.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if publishing fails.
pub fn handle_rearm_clock(
    command: &RearmClock,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<bool, DomainError> {
    let rearmed = session.rearm_clock(command.correlation_id, clock);
    if rearmed {
        publish_uncommitted(session, command, publisher)?;
    }
    Ok(rearmed)
}

/// Handles the `SkipPhase` command.
///
/// # Errors
///
/// Returns `DomainError::SubPhaseNotFound` or `DomainError::Validation` when
/// the sub-phase cannot be skipped, or `DomainError::Infrastructure` if
/// publishing fails.
pub fn handle_skip_phase(
    command: &SkipPhase,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<Vec<SubPhase>, DomainError> {
    let sub_phases = session.skip_phase(command.correlation_id, clock, &command.sub_phase_id)?;
    publish_uncommitted(session, command, publisher)?;
    Ok(sub_phases)
}

/// Handles the `ChangeDuration` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a zero length, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_change_duration(
    command: &ChangeDuration,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<NightView, DomainError> {
    let sub_phases = session.change_duration(command.correlation_id, clock, command.total_seconds)?;
    publish_uncommitted(session, command, publisher)?;
    Ok(night_view(session, sub_phases))
}

/// Handles the `CastVote` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidVote` when the vote is rejected, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_cast_vote(
    command: &CastVote,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<TallyResult, DomainError> {
    let tally = session.cast_vote(
        command.correlation_id,
        clock,
        &command.voter_id,
        &command.target_id,
    )?;
    publish_uncommitted(session, command, publisher)?;
    Ok(tally)
}

/// Handles the `StartRunoff` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty candidate list, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_start_runoff(
    command: &StartRunoff,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<SessionState, DomainError> {
    let state = session.start_runoff(command.correlation_id, clock, &command.candidates)?;
    publish_uncommitted(session, command, publisher)?;
    Ok(state)
}

/// Handles the `CastNightVote` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidVote` for empty ids, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_cast_night_vote(
    command: &CastNightVote,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<BallotView, DomainError> {
    let ballot = session.cast_night_vote(
        command.correlation_id,
        clock,
        &command.wolf_id,
        &command.victim_id,
    )?;
    publish_uncommitted(session, command, publisher)?;
    Ok(ballot)
}

/// Handles the `DesignateVictim` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` for an unknown victim, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_designate_victim(
    command: &DesignateVictim,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<BallotView, DomainError> {
    let ballot =
        session.designate_victim(command.correlation_id, clock, command.victim_id.clone())?;
    publish_uncommitted(session, command, publisher)?;
    Ok(ballot)
}

/// Handles the `EliminatePlayer` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` or `DomainError::AlreadyEliminated`,
/// or `DomainError::Infrastructure` if publishing fails.
pub fn handle_eliminate_player(
    command: &EliminatePlayer,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<EliminationOutcome, DomainError> {
    let outcome = session.eliminate(
        command.correlation_id,
        clock,
        &command.player_id,
        command.source,
        command.reason,
        command.details.clone(),
    )?;
    publish_uncommitted(session, command, publisher)?;
    Ok(outcome)
}

/// Handles the `ResurrectPlayer` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` for an unknown player, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_resurrect_player(
    command: &ResurrectPlayer,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<(), DomainError> {
    session.resurrect(command.correlation_id, clock, &command.player_id)?;
    publish_uncommitted(session, command, publisher)?;
    Ok(())
}

/// Handles the `BindRole` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` or `DomainError::Validation`, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_bind_role(
    command: &BindRole,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<RoleBinding, DomainError> {
    let binding = session.bind_role(
        command.correlation_id,
        clock,
        &command.subject_id,
        &command.master_id,
    )?;
    publish_uncommitted(session, command, publisher)?;
    Ok(binding)
}

/// Handles the `ChooseCamp` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` or `DomainError::Validation`, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_choose_camp(
    command: &ChooseCamp,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<(), DomainError> {
    session.choose_camp(command.correlation_id, clock, &command.player_id, command.camp)?;
    publish_uncommitted(session, command, publisher)?;
    Ok(())
}

/// Handles the `AppointMayor` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` or `DomainError::Validation`, or
/// `DomainError::Infrastructure` if publishing fails.
pub fn handle_appoint_mayor(
    command: &AppointMayor,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<(), DomainError> {
    session.appoint_mayor(command.correlation_id, clock, &command.player_id)?;
    publish_uncommitted(session, command, publisher)?;
    Ok(())
}

/// Handles the `ResetDay` command.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if publishing fails.
pub fn handle_reset_day(
    command: &ResetDay,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<(), DomainError> {
    session.reset_day(command.correlation_id, clock);
    publish_uncommitted(session, command, publisher)?;
    Ok(())
}

/// Handles the `ResetNight` command.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if publishing fails.
pub fn handle_reset_night(
    command: &ResetNight,
    session: &mut GameSession,
    clock: &dyn Clock,
    publisher: &dyn EventPublisher,
) -> Result<(), DomainError> {
    session.reset_night(command.correlation_id, clock);
    publish_uncommitted(session, command, publisher)?;
    Ok(())
}

/// Handles the `ResetSession` command: re-reads the roster and returns the
/// game to the lobby.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if publishing fails.
pub fn handle_reset_session(
    command: &ResetSession,
    session: &mut GameSession,
    clock: &dyn Clock,
    roster: &dyn RosterProvider,
    publisher: &dyn EventPublisher,
) -> Result<(), DomainError> {
    session.reset_session(command.correlation_id, clock, roster.players());
    publish_uncommitted(session, command, publisher)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use nightfall_core::aggregate::AggregateRoot;
    use nightfall_core::error::DomainError;
    use nightfall_elimination::domain::engine::{EliminationReason, EliminationSource};
    use nightfall_test_support::{
        FailingEventPublisher, FixedClock, NullEventPublisher, RecordingEventPublisher,
        StaticRoster, village_of,
    };
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregates::Phase;
    use crate::domain::events::{
        NIGHT_STARTED_EVENT_TYPE, PLAYER_ELIMINATED_EVENT_TYPE, SESSION_RESET_EVENT_TYPE,
        VOTE_CAST_EVENT_TYPE,
    };

    fn session() -> GameSession {
        GameSession::new(
            Uuid::new_v4(),
            village_of(&[("alice", "Voyante"), ("bob", "Loup-Garou"), ("carol", "Sorcière")]),
        )
    }

    #[test]
    fn test_handle_start_night_publishes_night_started() {
        // Arrange
        let clock = FixedClock::default();
        let publisher = RecordingEventPublisher::new();
        let mut session = session();
        let correlation_id = Uuid::new_v4();
        let command = StartNight {
            correlation_id,
            total_seconds: 3600,
            night_number: 1,
        };

        // Act
        let view = handle_start_night(&command, &mut session, &clock, &publisher).unwrap();

        // Assert
        assert_eq!(view.total_seconds, 3600);
        assert!(view.running);
        assert_eq!(view.sub_phases.len(), 6);

        let published = publisher.published_events();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_type, NIGHT_STARTED_EVENT_TYPE);
        assert_eq!(published[0].correlation_id, correlation_id);
        assert_eq!(published[0].aggregate_id, session.id);
        assert!(session.uncommitted_events().is_empty());
        assert_eq!(session.version(), 1);
    }

    #[test]
    fn test_rejected_command_publishes_nothing() {
        // Arrange
        let clock = FixedClock::default();
        let publisher = RecordingEventPublisher::new();
        let mut session = session();
        let command = CastVote {
            correlation_id: Uuid::new_v4(),
            voter_id: String::new(),
            target_id: "bob".into(),
        };

        // Act
        let result = handle_cast_vote(&command, &mut session, &clock, &publisher);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidVote(_))));
        assert!(publisher.published_events().is_empty());
    }

    #[test]
    fn test_handle_cast_vote_returns_tally() {
        let clock = FixedClock::default();
        let publisher = RecordingEventPublisher::new();
        let mut session = session();
        let command = CastVote {
            correlation_id: Uuid::new_v4(),
            voter_id: "alice".into(),
            target_id: "bob".into(),
        };

        let tally = handle_cast_vote(&command, &mut session, &clock, &publisher).unwrap();

        assert_eq!(tally.winner.as_deref(), Some("bob"));
        assert_eq!(publisher.published_types(), vec![VOTE_CAST_EVENT_TYPE]);
    }

    #[test]
    fn test_idle_tick_publishes_nothing() {
        let clock = FixedClock::default();
        let publisher = RecordingEventPublisher::new();
        let mut session = session();

        let outcome = handle_tick(
            &Tick {
                correlation_id: Uuid::new_v4(),
            },
            &mut session,
            &clock,
            &publisher,
        )
        .unwrap();

        assert_eq!(outcome, TickOutcome::Idle);
        assert!(publisher.published_events().is_empty());
    }

    #[test]
    fn test_handle_eliminate_player_publishes_elimination() {
        // Arrange
        let clock = FixedClock::default();
        let publisher = RecordingEventPublisher::new();
        let mut session = session();
        let command = EliminatePlayer {
            correlation_id: Uuid::new_v4(),
            player_id: "bob".into(),
            source: EliminationSource::Vote,
            reason: EliminationReason::Vote,
            details: Some("hanged at noon".into()),
        };

        // Act
        let outcome = handle_eliminate_player(&command, &mut session, &clock, &publisher).unwrap();

        // Assert
        assert_eq!(outcome.elimination.details.as_deref(), Some("hanged at noon"));
        let published = publisher.published_events();
        assert_eq!(published[0].event_type, PLAYER_ELIMINATED_EVENT_TYPE);
        assert_eq!(
            published[0].payload["PlayerEliminated"]["elimination"]["playerId"],
            "bob"
        );
    }

    #[test]
    fn test_handle_reset_session_rereads_the_roster() {
        // Arrange
        let clock = FixedClock::default();
        let publisher = RecordingEventPublisher::new();
        let roster = StaticRoster::new(village_of(&[("alice", "Voyante")]));
        let mut session = session();
        roster.replace(village_of(&[("zoe", "Villageois"), ("yann", "Loup-Garou")]));

        // Act
        handle_reset_session(
            &ResetSession {
                correlation_id: Uuid::new_v4(),
            },
            &mut session,
            &clock,
            &roster,
            &publisher,
        )
        .unwrap();

        // Assert
        assert_eq!(session.roster().players().len(), 2);
        assert!(session.roster().get("zoe").is_some());
        assert_eq!(publisher.published_types(), vec![SESSION_RESET_EVENT_TYPE]);
    }

    #[test]
    fn test_publisher_failure_surfaces_as_infrastructure_error() {
        let clock = FixedClock::default();
        let mut session = session();

        let result = handle_start_day(
            &StartDay {
                correlation_id: Uuid::new_v4(),
            },
            &mut session,
            &clock,
            &FailingEventPublisher,
        );

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(session.state().phase, Phase::Day);
        assert!(session.uncommitted_events().is_empty());
        assert_eq!(session.version(), 1);
    }

    #[test]
    fn test_change_duration_reports_countdown() {
        // Arrange
        let clock = FixedClock::default();
        let publisher = NullEventPublisher;
        let mut session = session();
        handle_start_night(
            &StartNight {
                correlation_id: Uuid::new_v4(),
                total_seconds: 3600,
                night_number: 1,
            },
            &mut session,
            &clock,
            &publisher,
        )
        .unwrap();

        // Act
        let view = handle_change_duration(
            &ChangeDuration {
                correlation_id: Uuid::new_v4(),
                total_seconds: 1800,
            },
            &mut session,
            &clock,
            &publisher,
        )
        .unwrap();

        // Assert
        assert_eq!(view.total_seconds, 1800);
        assert_eq!(view.remaining, 1800);
        let wolves = view.sub_phases.iter().find(|p| p.id == "wolves").unwrap();
        assert_eq!(wolves.duration, 900);
    }
}
