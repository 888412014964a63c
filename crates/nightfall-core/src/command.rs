//! Command abstractions.

use uuid::Uuid;

/// Trait that every moderator command implements.
///
/// Commands are plain data; the session aggregate decides whether they are
/// accepted. The correlation id travels into the metadata of the event the
/// command produces so a published delta can be traced back to its request.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}
