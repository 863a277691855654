//! Real-time departure queries for Berlin public transport (BVG).
//!
//! Resolves a station name against the live departure board and yields
//! either an ordered list of upcoming departures or a structured failure
//! (station ambiguous, station unknown, transport error).

pub mod bvg;
pub mod domain;
pub mod query;
