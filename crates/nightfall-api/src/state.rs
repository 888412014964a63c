//! Shared application state.

use std::sync::{Arc, Mutex};

use nightfall_core::clock::Clock;
use nightfall_core::error::DomainError;
use nightfall_core::publisher::{EventPublisher, StoredEvent};
use nightfall_core::roster::RosterProvider;
use nightfall_session::domain::aggregates::GameSession;
use tokio::sync::broadcast;
use tracing::debug;

/// Events buffered per stream subscriber before it starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Publisher that fans session events out to every connected stream.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<StoredEvent>,
}

impl BroadcastPublisher {
    /// Creates a publisher buffering `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Opens a new subscription; it sees events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoredEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, events: &[StoredEvent]) -> Result<(), DomainError> {
        for event in events {
            // Sending only fails when nobody is listening.
            if self.sender.send(event.clone()).is_err() {
                debug!(event_type = %event.event_type, "no stream subscribers");
            }
        }
        Ok(())
    }
}

/// Application state shared across all request handlers and the tick driver.
#[derive(Clone)]
pub struct AppState {
    /// The one game this server moderates.
    pub session: Arc<Mutex<GameSession>>,
    /// Wall clock used to stamp events and eliminations.
    pub clock: Arc<dyn Clock>,
    /// Event stream fan-out.
    pub publisher: Arc<BroadcastPublisher>,
    /// Source of the player list on session reset.
    pub roster: Arc<dyn RosterProvider>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        session: GameSession,
        clock: Arc<dyn Clock>,
        roster: Arc<dyn RosterProvider>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            clock,
            publisher: Arc::new(BroadcastPublisher::new(EVENT_CHANNEL_CAPACITY)),
            roster,
        }
    }

    /// Runs `operation` against the session while holding its lock.
    ///
    /// # Errors
    ///
    /// Returns whatever `operation` returns, or `DomainError::Infrastructure`
    /// if a previous holder panicked.
    pub fn with_session<T>(
        &self,
        operation: impl FnOnce(
            &mut GameSession,
            &dyn Clock,
            &dyn EventPublisher,
        ) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| DomainError::Infrastructure("session lock poisoned".to_string()))?;
        operation(&mut session, self.clock.as_ref(), self.publisher.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use nightfall_test_support::{FixedClock, StaticRoster, fixed_now, village_of};
    use uuid::Uuid;

    use super::*;

    fn stored(event_type: &str) -> StoredEvent {
        let id = Uuid::new_v4();
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: id,
            event_type: event_type.to_string(),
            payload: serde_json::json!({}),
            sequence_number: 1,
            correlation_id: id,
            causation_id: id,
            occurred_at: fixed_now(),
        }
    }

    #[test]
    fn test_publish_without_subscribers_succeeds() {
        let publisher = BroadcastPublisher::new(4);

        let result = publisher.publish(&[stored("session.day_started")]);

        assert!(result.is_ok());
    }

    #[test]
    fn test_subscriber_receives_published_events_in_order() {
        // Arrange
        let publisher = BroadcastPublisher::new(4);
        let mut rx = publisher.subscribe();

        // Act
        publisher
            .publish(&[stored("session.night_started"), stored("session.clock_ticked")])
            .unwrap();

        // Assert
        assert_eq!(rx.try_recv().unwrap().event_type, "session.night_started");
        assert_eq!(rx.try_recv().unwrap().event_type, "session.clock_ticked");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_with_session_runs_operation_under_lock() {
        let state = AppState::new(
            GameSession::new(Uuid::new_v4(), village_of(&[("alice", "Voyante")])),
            Arc::new(FixedClock::default()),
            Arc::new(StaticRoster::default()),
        );

        let count = state
            .with_session(|session, _, _| Ok(session.roster().players().len()))
            .unwrap();

        assert_eq!(count, 1);
    }
}
