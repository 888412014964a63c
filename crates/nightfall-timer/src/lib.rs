//! Nightfall — night countdown and sub-phase scheduling.
//!
//! Responsible for the shared countdown that paces a night and for slicing
//! that night into ordered, role-specific sub-phases, including the
//! reallocations that happen when the moderator skips a phase or changes
//! the night's length mid-flight.

pub mod domain;
