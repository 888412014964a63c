//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Every variant is local and recoverable. A domain rejection (any variant
/// but `Infrastructure`) leaves the state it was called on untouched. An
/// `Infrastructure` error from publishing is reported after the change has
/// already been applied and its events drained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A vote was rejected (empty ids, or a target outside the runoff set).
    #[error("invalid vote: {0}")]
    InvalidVote(String),

    /// The player already has an active elimination.
    #[error("player already eliminated: {0}")]
    AlreadyEliminated(String),

    /// The player is not part of the roster.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// No sub-phase with that id is scheduled tonight.
    #[error("sub-phase not found: {0}")]
    SubPhaseNotFound(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure error (publishing, serialization).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `true` for rejections that the moderator surfaces as a plain
    /// `false` result instead of a failure.
    #[must_use]
    pub fn is_soft_rejection(&self) -> bool {
        matches!(self, Self::InvalidVote(_) | Self::AlreadyEliminated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_vote_and_already_eliminated_are_soft_rejections() {
        assert!(DomainError::InvalidVote("empty voter".into()).is_soft_rejection());
        assert!(DomainError::AlreadyEliminated("alice".into()).is_soft_rejection());
    }

    #[test]
    fn test_lookup_failures_are_not_soft_rejections() {
        assert!(!DomainError::PlayerNotFound("bob".into()).is_soft_rejection());
        assert!(!DomainError::SubPhaseNotFound("witch".into()).is_soft_rejection());
        assert!(!DomainError::Validation("bad".into()).is_soft_rejection());
    }

    #[test]
    fn test_display_includes_the_subject() {
        let err = DomainError::AlreadyEliminated("alice".into());
        assert_eq!(err.to_string(), "player already eliminated: alice");
    }
}
