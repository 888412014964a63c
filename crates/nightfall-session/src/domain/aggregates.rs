//! Aggregate root for the game session.

use nightfall_core::aggregate::AggregateRoot;
use nightfall_core::clock::Clock;
use nightfall_core::error::DomainError;
use nightfall_core::event::EventMetadata;
use nightfall_core::roster::Player;
use nightfall_elimination::domain::camps::Camp;
use nightfall_elimination::domain::engine::{
    EliminationEngine, EliminationOutcome, EliminationReason, EliminationSource, RoleBinding,
};
use nightfall_elimination::domain::roster::Roster;
use nightfall_timer::domain::catalog::{PhaseDefinition, default_catalog};
use nightfall_timer::domain::countdown::{Countdown, TickOutcome};
use nightfall_timer::domain::scheduler::{PhaseScheduler, SubPhase};
use nightfall_voting::domain::ballot::{BallotView, NightBallot};
use nightfall_voting::domain::tally::{TallyResult, VoteTally};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::events::{
    CampChosen, ClockCompleted, ClockRearmed, ClockTicked, DayStarted, DurationChanged,
    MayorAppointed, NightStarted, NightVoteCast, PhaseSkipped, PlayerEliminated,
    PlayerResurrected, RoleBound, RunoffStarted, SessionEvent, SessionEventKind, SessionReset,
    VictimDesignated, VoteCast,
};

/// Where the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// No night has started yet.
    #[default]
    Lobby,
    /// The village debates and votes.
    Day,
    /// The night roles act.
    Night,
}

/// Session-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Current phase.
    pub phase: Phase,
    /// Number of nights begun, counting a restarted night once.
    pub cycle_count: u32,
    /// Index passed to the most recent night start.
    pub night_number: u32,
    /// Whether the day vote is a runoff.
    pub is_runoff: bool,
    /// Runoff candidates, sorted.
    pub runoff_candidates: Vec<String>,
}

/// The aggregate root for one moderated game.
#[derive(Debug)]
pub struct GameSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (events drained so far).
    pub(crate) version: i64,
    pub(crate) phase: Phase,
    pub(crate) cycle_count: u32,
    pub(crate) night_number: u32,
    pub(crate) countdown: Countdown,
    pub(crate) scheduler: PhaseScheduler,
    pub(crate) catalog: Vec<PhaseDefinition>,
    pub(crate) tally: VoteTally,
    pub(crate) ballot: NightBallot,
    pub(crate) engine: EliminationEngine,
    pub(crate) roster: Roster,
    /// Uncommitted events pending publication.
    uncommitted_events: Vec<SessionEvent>,
}

impl GameSession {
    /// Creates a game in the lobby with the standard night catalog.
    #[must_use]
    pub fn new(id: Uuid, players: Vec<Player>) -> Self {
        Self {
            id,
            version: 0,
            phase: Phase::Lobby,
            cycle_count: 0,
            night_number: 0,
            countdown: Countdown::default(),
            scheduler: PhaseScheduler::new(),
            catalog: default_catalog(),
            tally: VoteTally::new(),
            ballot: NightBallot::new(),
            engine: EliminationEngine::new(),
            roster: Roster::from_players(players),
            uncommitted_events: Vec::new(),
        }
    }

    /// Replaces the night catalog used by subsequent nights.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Vec<PhaseDefinition>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the countdown's length before the first night.
    #[must_use]
    pub fn with_night_seconds(mut self, total_seconds: u32) -> Self {
        self.countdown = Countdown::new(total_seconds);
        self
    }

    /// Session-wide state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState {
            phase: self.phase,
            cycle_count: self.cycle_count,
            night_number: self.night_number,
            is_runoff: self.tally.is_runoff(),
            runoff_candidates: self.tally.candidates().iter().cloned().collect(),
        }
    }

    /// The countdown.
    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Tonight's schedule.
    #[must_use]
    pub fn sub_phases(&self) -> &[SubPhase] {
        self.scheduler.phases()
    }

    /// The day vote.
    #[must_use]
    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    /// The wolves' ballot.
    #[must_use]
    pub fn ballot(&self) -> &NightBallot {
        &self.ballot
    }

    /// The elimination engine.
    #[must_use]
    pub fn engine(&self) -> &EliminationEngine {
        &self.engine
    }

    /// The seated players.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The sub-phase `player_id` takes part in tonight, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player.
    pub fn night_phase_of(&self, player_id: &str) -> Result<Option<&str>, DomainError> {
        let player = self.roster.require(player_id)?;
        Ok(self
            .scheduler
            .phase_for_role(&player.role, self.engine.has_switched(player_id)))
    }

    /// The camp `player_id` plays for.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player.
    pub fn camp_of(&self, player_id: &str) -> Result<Camp, DomainError> {
        self.engine.camp_of(&self.roster, player_id)
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, correlation_id: Uuid, clock: &dyn Clock, kind: SessionEventKind) {
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    /// Begins night `night_number`: loads its schedule and starts the
    /// countdown at `total_seconds`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a zero length or night number.
    pub fn start_night(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        total_seconds: u32,
        night_number: u32,
    ) -> Result<(), DomainError> {
        if total_seconds == 0 {
            return Err(DomainError::Validation("a night must last at least one second".to_owned()));
        }
        if night_number == 0 {
            return Err(DomainError::Validation("nights are numbered from 1".to_owned()));
        }

        if self.phase != Phase::Night {
            self.cycle_count += 1;
        }
        self.phase = Phase::Night;
        self.night_number = night_number;
        self.ballot.reset();
        self.scheduler.load(&self.catalog, night_number, total_seconds);
        self.countdown.reset(total_seconds);
        self.countdown.start();
        info!(session_id = %self.id, night_number, total_seconds, "night started");

        self.record(
            correlation_id,
            clock,
            SessionEventKind::NightStarted(NightStarted {
                night_number,
                total_seconds,
                cycle_count: self.cycle_count,
                sub_phases: self.scheduler.phases().to_vec(),
            }),
        );
        Ok(())
    }

    /// Begins a day: stops the countdown and opens a fresh vote.
    pub fn start_day(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.phase = Phase::Day;
        self.countdown.stop();
        self.tally.reset();
        info!(session_id = %self.id, cycle_count = self.cycle_count, "day started");

        self.record(
            correlation_id,
            clock,
            SessionEventKind::DayStarted(DayStarted {
                cycle_count: self.cycle_count,
            }),
        );
    }

    /// Advances the countdown by one second and refreshes the schedule.
    /// Records nothing while the countdown is stopped.
    pub fn tick(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> TickOutcome {
        let outcome = self.countdown.tick();
        let total = self.countdown.total();
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Ticked { remaining } => {
                self.scheduler.refresh(total, self.countdown.elapsed());
                let active_phases = self
                    .scheduler
                    .active_ids()
                    .into_iter()
                    .map(str::to_owned)
                    .collect();
                self.record(
                    correlation_id,
                    clock,
                    SessionEventKind::ClockTicked(ClockTicked {
                        remaining,
                        active_phases,
                    }),
                );
            }
            TickOutcome::Completed => {
                self.scheduler.refresh_activity(total);
                info!(session_id = %self.id, total, "countdown completed");
                self.record(
                    correlation_id,
                    clock,
                    SessionEventKind::ClockCompleted(ClockCompleted {
                        total_seconds: total,
                    }),
                );
            }
        }
        outcome
    }

    /// Restarts a completed countdown. Returns `false` if nothing was
    /// pending.
    pub fn rearm_clock(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if !self.countdown.rearm() {
            return false;
        }
        let total = self.countdown.total();
        // A fresh run starts from the night's full schedule, without the
        // previous run's skips.
        if self.phase == Phase::Night {
            self.scheduler.load(&self.catalog, self.night_number, total);
        }
        self.scheduler.refresh(total, self.countdown.elapsed());
        self.record(
            correlation_id,
            clock,
            SessionEventKind::ClockRearmed(ClockRearmed {
                total_seconds: total,
            }),
        );
        true
    }

    /// Ends the running sub-phase `sub_phase_id` now.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` outside a night or when the
    /// sub-phase is not running, and `DomainError::SubPhaseNotFound` for an
    /// unknown id.
    pub fn skip_phase(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        sub_phase_id: &str,
    ) -> Result<Vec<SubPhase>, DomainError> {
        if self.phase != Phase::Night {
            return Err(DomainError::Validation("no night in progress".to_owned()));
        }

        let total = self.countdown.total();
        let elapsed = self.countdown.elapsed();
        self.scheduler.refresh(total, elapsed);
        let sub_phases = self
            .scheduler
            .skip_to_next(sub_phase_id, elapsed, total)?
            .to_vec();
        info!(session_id = %self.id, sub_phase_id, elapsed, "sub-phase skipped");

        self.record(
            correlation_id,
            clock,
            SessionEventKind::PhaseSkipped(PhaseSkipped {
                sub_phase_id: sub_phase_id.to_owned(),
                elapsed,
                sub_phases: sub_phases.clone(),
            }),
        );
        Ok(sub_phases)
    }

    /// Changes the night's length, keeping the time already elapsed, and
    /// re-plans the rest of the night.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a zero length.
    pub fn change_duration(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        total_seconds: u32,
    ) -> Result<Vec<SubPhase>, DomainError> {
        if total_seconds == 0 {
            return Err(DomainError::Validation("a night must last at least one second".to_owned()));
        }

        let previous_total_seconds = self.countdown.total();
        let elapsed = self.countdown.elapsed();
        self.countdown.set_total(total_seconds);
        let sub_phases = self
            .scheduler
            .adjust_for_new_total(total_seconds, elapsed)
            .to_vec();
        info!(
            session_id = %self.id,
            previous_total_seconds,
            total_seconds,
            elapsed,
            "night duration changed"
        );

        self.record(
            correlation_id,
            clock,
            SessionEventKind::DurationChanged(DurationChanged {
                previous_total_seconds,
                total_seconds,
                remaining: self.countdown.remaining(),
                sub_phases: sub_phases.clone(),
            }),
        );
        Ok(sub_phases)
    }

    /// Records a day vote and returns the updated count.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVote` when the vote is rejected.
    pub fn cast_vote(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        voter_id: &str,
        target_id: &str,
    ) -> Result<TallyResult, DomainError> {
        self.tally.cast_vote(voter_id, target_id)?;
        let tally = self.tally.tally();

        self.record(
            correlation_id,
            clock,
            SessionEventKind::VoteCast(VoteCast {
                voter_id: voter_id.to_owned(),
                target_id: target_id.to_owned(),
                tally: tally.clone(),
            }),
        );
        Ok(tally)
    }

    /// Opens a runoff between `candidates`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an empty candidate list.
    pub fn start_runoff(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        candidates: &[String],
    ) -> Result<SessionState, DomainError> {
        self.tally.start_runoff(candidates)?;
        let state = self.state();
        info!(session_id = %self.id, candidates = ?state.runoff_candidates, "runoff started");

        self.record(
            correlation_id,
            clock,
            SessionEventKind::RunoffStarted(RunoffStarted {
                candidates: state.runoff_candidates.clone(),
            }),
        );
        Ok(state)
    }

    /// Records a wolf's night vote.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVote` for empty ids.
    pub fn cast_night_vote(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        wolf_id: &str,
        victim_id: &str,
    ) -> Result<BallotView, DomainError> {
        self.ballot.cast(wolf_id, victim_id)?;
        let ballot = self.ballot.view();

        self.record(
            correlation_id,
            clock,
            SessionEventKind::NightVoteCast(NightVoteCast {
                wolf_id: wolf_id.to_owned(),
                victim_id: victim_id.to_owned(),
                ballot: ballot.clone(),
            }),
        );
        Ok(ballot)
    }

    /// Settles or clears the wolves' victim.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown victim.
    pub fn designate_victim(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        victim_id: Option<String>,
    ) -> Result<BallotView, DomainError> {
        let victim_id = victim_id.filter(|v| !v.is_empty());
        if let Some(victim) = &victim_id {
            self.roster.require(victim)?;
        }
        self.ballot.designate(victim_id.clone());

        self.record(
            correlation_id,
            clock,
            SessionEventKind::VictimDesignated(VictimDesignated { victim_id }),
        );
        Ok(self.ballot.view())
    }

    /// Eliminates a player, timestamped by `clock`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` or
    /// `DomainError::AlreadyEliminated`.
    pub fn eliminate(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        player_id: &str,
        source: EliminationSource,
        reason: EliminationReason,
        details: Option<String>,
    ) -> Result<EliminationOutcome, DomainError> {
        let outcome = self.engine.eliminate(
            &mut self.roster,
            player_id,
            source,
            reason,
            details,
            clock.now(),
        )?;

        self.record(
            correlation_id,
            clock,
            SessionEventKind::PlayerEliminated(PlayerEliminated {
                elimination: outcome.elimination.clone(),
                role_switches: outcome.role_switches.clone(),
            }),
        );
        Ok(outcome)
    }

    /// Brings a player back.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` for an unknown player.
    pub fn resurrect(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        player_id: &str,
    ) -> Result<(), DomainError> {
        self.engine.resurrect(&mut self.roster, player_id)?;
        self.record(
            correlation_id,
            clock,
            SessionEventKind::PlayerResurrected(PlayerResurrected {
                player_id: player_id.to_owned(),
            }),
        );
        Ok(())
    }

    /// Binds a wild child to its master.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` or `DomainError::Validation`.
    pub fn bind_role(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        subject_id: &str,
        master_id: &str,
    ) -> Result<RoleBinding, DomainError> {
        let binding = self
            .engine
            .bind(&self.roster, subject_id, master_id)?
            .clone();
        self.record(
            correlation_id,
            clock,
            SessionEventKind::RoleBound(RoleBound {
                binding: binding.clone(),
            }),
        );
        Ok(binding)
    }

    /// Records a wolf-dog's camp.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` or `DomainError::Validation`.
    pub fn choose_camp(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        player_id: &str,
        camp: Camp,
    ) -> Result<(), DomainError> {
        self.engine.choose_camp(&self.roster, player_id, camp)?;
        self.record(
            correlation_id,
            clock,
            SessionEventKind::CampChosen(CampChosen {
                player_id: player_id.to_owned(),
                camp,
            }),
        );
        Ok(())
    }

    /// Hands the mayor's sash to `player_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PlayerNotFound` or `DomainError::Validation`.
    pub fn appoint_mayor(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
        player_id: &str,
    ) -> Result<(), DomainError> {
        self.roster.appoint_mayor(player_id)?;
        self.record(
            correlation_id,
            clock,
            SessionEventKind::MayorAppointed(MayorAppointed {
                player_id: player_id.to_owned(),
            }),
        );
        Ok(())
    }

    /// Clears the day vote and any runoff.
    pub fn reset_day(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.tally.reset();
        info!(session_id = %self.id, "day reset");
        self.record(correlation_id, clock, SessionEventKind::DayReset);
    }

    /// Stops the countdown and clears tonight's schedule and ballot.
    pub fn reset_night(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.countdown.reset(self.countdown.total());
        self.scheduler.clear();
        self.ballot.reset();
        info!(session_id = %self.id, "night reset");
        self.record(correlation_id, clock, SessionEventKind::NightReset);
    }

    /// Seats `players` and returns the game to the lobby.
    pub fn reset_session(&mut self, correlation_id: Uuid, clock: &dyn Clock, players: Vec<Player>) {
        self.roster = Roster::from_players(players);
        self.engine.reset();
        self.engine.clear_bindings();
        self.engine.clear_camp_choices();
        self.tally.reset();
        self.ballot.reset();
        self.scheduler.clear();
        self.countdown.reset(self.countdown.total());
        self.phase = Phase::Lobby;
        self.cycle_count = 0;
        self.night_number = 0;
        let player_count = self.roster.players().len();
        info!(session_id = %self.id, player_count, "session reset");

        self.record(
            correlation_id,
            clock,
            SessionEventKind::SessionReset(SessionReset { player_count }),
        );
    }
}

impl AggregateRoot for GameSession {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    #[allow(clippy::cast_possible_wrap)]
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        let drained = std::mem::take(&mut self.uncommitted_events);
        self.version += drained.len() as i64;
        drained
    }
}
