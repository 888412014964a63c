//! Domain model for votes.

pub mod ballot;
pub mod tally;
