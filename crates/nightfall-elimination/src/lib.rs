//! Nightfall — eliminations.
//!
//! Responsible for the player roster's alive flags, the append-only
//! elimination log, and the consequences an elimination has on other
//! players: a wild child whose master dies switches to the wolves. Also
//! answers which camp a player belongs to.

pub mod domain;
