//! Nightfall — voting.
//!
//! Responsible for the village's day vote (plurality, tie detection and the
//! restricted runoff round) and for the wolves' night ballot that designates
//! their victim.

pub mod domain;
