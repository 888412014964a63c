//! The one-second tick driver.
//!
//! A background task advances the countdown once per second. When a night
//! completes it waits `REARM_GRACE` and restarts the countdown, so the
//! moderator's clock loops until a day starts.

use std::time::Duration;

use nightfall_core::error::DomainError;
use nightfall_session::application::command_handlers;
use nightfall_session::domain::commands;
use nightfall_timer::domain::countdown::{REARM_GRACE, TickOutcome};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Interval between two ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Spawns the tick driver on the current runtime.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    tokio::spawn(run(state))
}

/// Ticks forever.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("tick driver started");

    loop {
        interval.tick().await;
        match tick_once(&state) {
            Ok(TickOutcome::Completed) => {
                tokio::time::sleep(REARM_GRACE).await;
                if let Err(err) = rearm(&state) {
                    warn!(error = %err, "countdown rearm failed");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "tick failed"),
        }
    }
}

/// Advances the session's countdown by one second.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned or
/// publishing fails.
pub fn tick_once(state: &AppState) -> Result<TickOutcome, DomainError> {
    let command = commands::Tick {
        correlation_id: Uuid::new_v4(),
    };
    state.with_session(|session, clock, publisher| {
        command_handlers::handle_tick(&command, session, clock, publisher)
    })
}

/// Restarts a completed countdown; returns `false` when there was nothing to
/// rearm.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned or
/// publishing fails.
pub fn rearm(state: &AppState) -> Result<bool, DomainError> {
    let command = commands::RearmClock {
        correlation_id: Uuid::new_v4(),
    };
    state.with_session(|session, clock, publisher| {
        command_handlers::handle_rearm_clock(&command, session, clock, publisher)
    })
}
