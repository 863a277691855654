//! BVG live departure backend.
//!
//! Queries the BVG HAFAS REST endpoints: a `locations` search resolves
//! the station name (zero hits means unknown, several mean ambiguous),
//! then `stops/{id}/departures` supplies the board rows.

mod client;
mod types;

pub use client::{ActualDepartureQuery, BvgClient, BvgConfig};
pub use types::{DepartureDto, DeparturesResponse, LineDto, LocationDto};
