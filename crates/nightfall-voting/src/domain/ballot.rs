//! The wolves' night ballot.

use nightfall_core::error::DomainError;
use serde::Serialize;

/// Read model of the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotView {
    /// Wolf to victim, in the order the wolves first voted.
    pub votes: Vec<(String, String)>,
    /// The current majority, if any.
    pub majority_victim: Option<String>,
    /// The victim the moderator settled on.
    pub victim: Option<String>,
}

/// One vote per wolf, plus the moderator's designated victim.
#[derive(Debug, Clone, Default)]
pub struct NightBallot {
    votes: Vec<(String, String)>,
    victim: Option<String>,
}

impl NightBallot {
    /// Creates an empty ballot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records or replaces `wolf_id`'s choice. A wolf keeps its original
    /// position when it changes its mind.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVote` if either id is empty.
    pub fn cast(&mut self, wolf_id: &str, victim_id: &str) -> Result<(), DomainError> {
        if wolf_id.is_empty() || victim_id.is_empty() {
            return Err(DomainError::InvalidVote("wolf and victim are required".to_owned()));
        }

        match self.votes.iter_mut().find(|(wolf, _)| wolf == wolf_id) {
            Some((_, victim)) => victim_id.clone_into(victim),
            None => self.votes.push((wolf_id.to_owned(), victim_id.to_owned())),
        }
        Ok(())
    }

    /// The target with strictly the most votes; among equal counts the one
    /// voted for first wins.
    #[must_use]
    pub fn majority_victim(&self) -> Option<&str> {
        let mut counts: Vec<(&str, u32)> = Vec::new();
        for (_, target) in &self.votes {
            match counts.iter_mut().find(|(t, _)| *t == target.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((target.as_str(), 1)),
            }
        }

        let mut best: Option<(&str, u32)> = None;
        for (target, count) in counts {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((target, count));
            }
        }
        best.map(|(target, _)| target)
    }

    /// Settles on a victim, or clears it with `None`.
    pub fn designate(&mut self, victim: Option<String>) {
        self.victim = victim.filter(|v| !v.is_empty());
    }

    /// The designated victim.
    #[must_use]
    pub fn victim(&self) -> Option<&str> {
        self.victim.as_deref()
    }

    /// Clears votes and the victim.
    pub fn reset(&mut self) {
        self.votes.clear();
        self.victim = None;
    }

    /// Builds the read model.
    #[must_use]
    pub fn view(&self) -> BallotView {
        BallotView {
            votes: self.votes.clone(),
            majority_victim: self.majority_victim().map(str::to_owned),
            victim: self.victim.clone(),
        }
    }
}
