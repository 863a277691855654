//! Domain types for departure boards.
//!
//! This module contains the time-normalization protocol and the departure
//! entity built on top of it. All invariants (minute granularity, day
//! rollover) are enforced at construction time, so code that receives a
//! [`Departure`] can trust its countdown.

mod departure;
mod time;

pub use departure::Departure;
pub use time::{TimeError, When, compute_remaining, full_format, normalize};
