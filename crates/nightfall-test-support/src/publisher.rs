//! Test publishers — mock `EventPublisher` implementations for tests.

use std::sync::Mutex;

use nightfall_core::error::DomainError;
use nightfall_core::publisher::{EventPublisher, StoredEvent};

/// A publisher that records every published event in order.
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    published: Mutex<Vec<StoredEvent>>,
}

impl RecordingEventPublisher {
    /// Creates an empty recording publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all events that were published.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published_events(&self) -> Vec<StoredEvent> {
        self.published.lock().unwrap().clone()
    }

    /// Returns the event types published so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published_types(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, events: &[StoredEvent]) -> Result<(), DomainError> {
        self.published.lock().unwrap().extend_from_slice(events);
        Ok(())
    }
}

/// A publisher that silently drops everything.
#[derive(Debug, Default)]
pub struct NullEventPublisher;

impl EventPublisher for NullEventPublisher {
    fn publish(&self, _events: &[StoredEvent]) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A publisher that always fails. Useful for testing error-handling paths.
#[derive(Debug, Default)]
pub struct FailingEventPublisher;

impl EventPublisher for FailingEventPublisher {
    fn publish(&self, _events: &[StoredEvent]) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("event stream closed".into()))
    }
}
