//! Wire DTOs for the BVG HAFAS REST API.

use chrono::DateTime;
use serde::Deserialize;

use crate::domain::When;
use crate::query::DepartureRecord;

/// One entry of a `locations` search result.
///
/// Only stops matter here; addresses and points of interest are filtered
/// out by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl LocationDto {
    /// Whether this entry is a queryable stop.
    pub fn is_stop(&self) -> bool {
        self.kind == "stop" || self.kind == "station"
    }
}

/// Wrapper for the departures response.
#[derive(Debug, Deserialize)]
pub struct DeparturesResponse {
    pub departures: Vec<DepartureDto>,
}

/// Minimal DTO for one board row - only what a record needs.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartureDto {
    /// Realtime departure; `null` for cancelled services.
    pub when: Option<String>,
    /// Scheduled departure, kept when realtime data is missing.
    #[serde(rename = "plannedWhen")]
    pub planned_when: Option<String>,
    pub direction: Option<String>,
    pub line: Option<LineDto>,
}

/// The line a board row belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct LineDto {
    pub name: Option<String>,
}

impl DepartureDto {
    /// Convert a board row into a raw departure record.
    ///
    /// Rows without any usable time (cancelled with no planned time)
    /// yield `None` and are skipped by the caller.
    pub fn into_record(self) -> Option<DepartureRecord> {
        let raw = self.when.or(self.planned_when)?;
        Some(DepartureRecord {
            destination: self.direction.unwrap_or_default(),
            line: self.line.and_then(|line| line.name).unwrap_or_default(),
            when: parse_when(&raw),
        })
    }
}

/// Interpret a board timestamp.
///
/// The API reports RFC 3339 with the Berlin offset; the wall-clock part
/// is what the board shows, so keep it as a naive local instant. Anything
/// else (a bare "HH:MM" cell) is handed to the flexible text parser.
fn parse_when(raw: &str) -> When {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => When::Instant(instant.naive_local()),
        Err(_) => When::Text(raw.to_owned()),
    }
}
