//! Event publisher abstraction.
//!
//! A session produces one consolidated event per accepted command. Consumers
//! subscribe to that single stream instead of wiring a callback per field.

use uuid::Uuid;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Published representation of a domain event.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Session this event belongs to.
    pub aggregate_id: Uuid,
    /// Event type name.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the session stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl StoredEvent {
    /// Builds the published form of a domain event.
    pub fn from_event<E: DomainEvent>(event: &E) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }
}

/// Sink for the session's consolidated event stream.
///
/// Publishing is synchronous and runs while the caller still holds the
/// session, so implementations must not block.
pub trait EventPublisher: Send + Sync {
    /// Publishes events in order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the sink is unavailable.
    fn publish(&self, events: &[StoredEvent]) -> Result<(), DomainError>;
}
