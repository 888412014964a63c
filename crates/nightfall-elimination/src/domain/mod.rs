//! Domain model for eliminations.

pub mod camps;
pub mod engine;
pub mod roster;
