//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that buffer the events their commands produce.
///
/// The moderator keeps its state in memory, so unlike an event-sourced
/// aggregate there is no replay: events are a publication of what changed,
/// drained by the application layer after each command.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events produced so far).
    fn version(&self) -> i64;

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drains uncommitted events after publication.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
