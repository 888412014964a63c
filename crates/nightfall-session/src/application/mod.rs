//! Application services for the game session.

pub mod command_handlers;
pub mod query_handlers;
