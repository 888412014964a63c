//! Nightfall — game session.
//!
//! Composes the countdown, the night scheduler, the votes and the
//! elimination engine into one moderated game. Every accepted command
//! produces exactly one session event describing what changed.

pub mod application;
pub mod domain;
