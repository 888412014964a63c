//! The village's day vote.

use std::collections::{BTreeMap, BTreeSet};

use nightfall_core::error::DomainError;
use serde::Serialize;
use tracing::warn;

/// Outcome of counting the current votes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyResult {
    /// The target with strictly the most votes, if any.
    pub winner: Option<String>,
    /// Whether the top two counts are equal.
    pub is_tie: bool,
    /// Every target sharing the top count, sorted by id. Empty unless tied.
    pub tied_candidates: Vec<String>,
    /// Votes received per target.
    pub counts: BTreeMap<String, u32>,
}

/// Single-choice votes keyed by voter, with an optional runoff restriction.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    votes: BTreeMap<String, String>,
    runoff: bool,
    candidates: BTreeSet<String>,
}

impl VoteTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current votes, voter to target.
    #[must_use]
    pub fn votes(&self) -> &BTreeMap<String, String> {
        &self.votes
    }

    /// Whether a runoff round is in progress.
    #[must_use]
    pub fn is_runoff(&self) -> bool {
        self.runoff
    }

    /// Targets allowed during the runoff.
    #[must_use]
    pub fn candidates(&self) -> &BTreeSet<String> {
        &self.candidates
    }

    /// Records or replaces `voter_id`'s vote.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVote` if either id is empty or, during a
    /// runoff, the target is not a candidate. The votes are left unchanged.
    pub fn cast_vote(&mut self, voter_id: &str, target_id: &str) -> Result<(), DomainError> {
        if voter_id.is_empty() || target_id.is_empty() {
            warn!(voter_id, target_id, "vote rejected: empty id");
            return Err(DomainError::InvalidVote("voter and target are required".to_owned()));
        }
        if self.runoff && !self.candidates.contains(target_id) {
            warn!(voter_id, target_id, "vote rejected: target is not a runoff candidate");
            return Err(DomainError::InvalidVote(format!(
                "{target_id} is not a runoff candidate"
            )));
        }

        self.votes.insert(voter_id.to_owned(), target_id.to_owned());
        Ok(())
    }

    /// Counts the votes.
    #[must_use]
    pub fn tally(&self) -> TallyResult {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for target in self.votes.values() {
            *counts.entry(target.clone()).or_default() += 1;
        }

        let Some(max) = counts.values().copied().max() else {
            return TallyResult::default();
        };
        let leaders: Vec<String> = counts
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(target, _)| target.clone())
            .collect();

        if leaders.len() > 1 {
            TallyResult {
                winner: None,
                is_tie: true,
                tied_candidates: leaders,
                counts,
            }
        } else {
            TallyResult {
                winner: leaders.into_iter().next(),
                is_tie: false,
                tied_candidates: Vec::new(),
                counts,
            }
        }
    }

    /// Clears the votes and restricts further votes to `candidates`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an empty candidate list, leaving
    /// the tally unchanged.
    pub fn start_runoff(&mut self, candidates: &[String]) -> Result<(), DomainError> {
        let candidates: BTreeSet<String> = candidates
            .iter()
            .filter(|c| !c.is_empty())
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Err(DomainError::Validation(
                "a runoff needs at least one candidate".to_owned(),
            ));
        }

        self.votes.clear();
        self.runoff = true;
        self.candidates = candidates;
        Ok(())
    }

    /// Clears votes, the runoff flag and the candidates.
    pub fn reset(&mut self) {
        self.votes.clear();
        self.runoff = false;
        self.candidates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn test_plurality_target_wins() {
        // Arrange
        let mut tally = VoteTally::new();
        tally.cast_vote("v1", "alice").unwrap();
        tally.cast_vote("v2", "alice").unwrap();
        tally.cast_vote("v3", "bob").unwrap();

        // Act
        let result = tally.tally();

        // Assert
        assert_eq!(result.winner.as_deref(), Some("alice"));
        assert!(!result.is_tie);
        assert!(result.tied_candidates.is_empty());
        assert_eq!(result.counts["alice"], 2);
        assert_eq!(result.counts["bob"], 1);
    }

    #[test]
    fn test_two_targets_sharing_the_top_count_tie() {
        // Arrange
        let mut tally = VoteTally::new();
        tally.cast_vote("v1", "C").unwrap();
        tally.cast_vote("v2", "A").unwrap();
        tally.cast_vote("v3", "B").unwrap();
        tally.cast_vote("v4", "A").unwrap();
        tally.cast_vote("v5", "C").unwrap();

        // Act
        let result = tally.tally();

        // Assert
        assert!(result.is_tie);
        assert_eq!(result.winner, None);
        assert_eq!(result.tied_candidates, names(&["A", "C"]));
    }

    #[test]
    fn test_single_vote_each_is_a_tie() {
        let mut tally = VoteTally::new();
        tally.cast_vote("v1", "A").unwrap();
        tally.cast_vote("v2", "B").unwrap();

        let result = tally.tally();

        assert!(result.is_tie);
        assert_eq!(result.tied_candidates, names(&["A", "B"]));
    }

    #[test]
    fn test_no_votes_means_no_winner_and_no_tie() {
        let result = VoteTally::new().tally();

        assert_eq!(result.winner, None);
        assert!(!result.is_tie);
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_revote_overwrites_previous_choice() {
        // Arrange
        let mut tally = VoteTally::new();
        tally.cast_vote("v1", "alice").unwrap();

        // Act
        tally.cast_vote("v1", "bob").unwrap();

        // Assert
        assert_eq!(tally.votes().len(), 1);
        assert_eq!(tally.tally().winner.as_deref(), Some("bob"));
    }

    #[test]
    fn test_empty_ids_are_rejected() {
        let mut tally = VoteTally::new();

        assert!(matches!(
            tally.cast_vote("", "alice"),
            Err(DomainError::InvalidVote(_))
        ));
        assert!(matches!(
            tally.cast_vote("v1", ""),
            Err(DomainError::InvalidVote(_))
        ));
        assert!(tally.votes().is_empty());
    }

    #[test]
    fn test_runoff_rejects_targets_outside_candidates() {
        // Arrange
        let mut tally = VoteTally::new();
        tally.start_runoff(&names(&["A", "B"])).unwrap();
        tally.cast_vote("v1", "A").unwrap();
        let before = tally.votes().clone();

        // Act
        let result = tally.cast_vote("v2", "C");

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidVote(_))));
        assert_eq!(tally.votes(), &before);
    }

    #[test]
    fn test_start_runoff_clears_votes() {
        // Arrange
        let mut tally = VoteTally::new();
        tally.cast_vote("v1", "A").unwrap();

        // Act
        tally.start_runoff(&names(&["A", "B"])).unwrap();

        // Assert
        assert!(tally.is_runoff());
        assert!(tally.votes().is_empty());
        assert_eq!(tally.candidates().len(), 2);
    }

    #[test]
    fn test_empty_runoff_is_rejected_without_change() {
        let mut tally = VoteTally::new();
        tally.cast_vote("v1", "A").unwrap();

        let result = tally.start_runoff(&[]);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(!tally.is_runoff());
        assert_eq!(tally.votes().len(), 1);
    }

    #[test]
    fn test_reset_lifts_the_runoff() {
        let mut tally = VoteTally::new();
        tally.start_runoff(&names(&["A"])).unwrap();
        tally.cast_vote("v1", "A").unwrap();

        tally.reset();

        assert!(!tally.is_runoff());
        assert!(tally.candidates().is_empty());
        assert!(tally.votes().is_empty());
        tally.cast_vote("v1", "Z").unwrap();
    }

    #[test]
    fn test_result_serializes_in_camel_case() {
        let mut tally = VoteTally::new();
        tally.cast_vote("v1", "A").unwrap();

        let json = serde_json::to_value(tally.tally()).unwrap();

        assert_eq!(json["winner"], "A");
        assert_eq!(json["isTie"], false);
        assert_eq!(json["tiedCandidates"], serde_json::json!([]));
        assert_eq!(json["counts"]["A"], 1);
    }
}
