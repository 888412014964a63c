//! Domain model for night timing.

pub mod catalog;
pub mod countdown;
pub mod scheduler;
