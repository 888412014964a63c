//! Nightfall Core — shared domain abstractions.
//!
//! This crate defines the traits and types every moderator context depends
//! on: the wall clock, the domain error, event envelopes and the publisher
//! seam. It contains no game rules and no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod publisher;
pub mod roster;
