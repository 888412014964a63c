//! Domain model for the game session.

pub mod aggregates;
pub mod commands;
pub mod events;
