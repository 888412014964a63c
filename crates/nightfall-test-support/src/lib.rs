//! Shared test doubles and utilities for the Nightfall werewolf moderator.

mod clock;
mod publisher;
mod roster;

pub use clock::{FixedClock, SteppingClock, fixed_now};
pub use publisher::{FailingEventPublisher, NullEventPublisher, RecordingEventPublisher};
pub use roster::{StaticRoster, village_of};
