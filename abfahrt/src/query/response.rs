//! The tri-state result of a station query.

use std::fmt;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeTuple, Serializer};

use crate::domain::{Departure, TimeError};

use super::QueryOutcome;

/// Why a query produced no departures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    /// The name matched several stations; candidates in upstream order.
    Ambiguous(Vec<String>),
    /// The name matched nothing.
    NotFound,
    /// The backend reported an error message.
    Error(String),
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryFailure::Ambiguous(names) => {
                write!(f, "Station is ambiguous: {}", names.join(", "))
            }
            QueryFailure::NotFound => write!(f, "Station does not exist"),
            QueryFailure::Error(message) => f.write_str(message),
        }
    }
}

/// The departures of one resolved station.
#[derive(Debug, Clone)]
pub struct StationBoard {
    /// The station name the query resolved to.
    pub station: String,
    /// Departures in board order.
    pub departures: Vec<Departure>,
}

impl Serialize for StationBoard {
    // Serializes as a two-element `[station, departures]` pair.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.station)?;
        pair.serialize_element(&self.departures)?;
        pair.end()
    }
}

/// Error raised when merging responses that are not both successes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The response being merged into was a failure.
    #[error("cannot merge into a failed response: {0}")]
    SelfFailed(String),

    /// The response being merged in was a failure.
    #[error("cannot merge a failed response: {0}")]
    OtherFailed(String),
}

/// Result of querying one station name: either the resolved station with
/// its departures (possibly aggregated with further stations via
/// [`Response::merge`]) or a [`QueryFailure`].
///
/// Failures are the expected, common path and are data; they are never
/// raised as errors.
#[derive(Debug, Clone)]
pub enum Response {
    /// One `(station, departures)` board per merged-in query.
    Success { boards: Vec<StationBoard> },
    /// The station did not resolve.
    Failure(QueryFailure),
}

impl Response {
    /// A successful single-station response.
    pub fn success(station: impl Into<String>, departures: Vec<Departure>) -> Self {
        Response::Success {
            boards: vec![StationBoard {
                station: station.into(),
                departures,
            }],
        }
    }

    /// A failure from the candidate names the upstream offered.
    ///
    /// An empty list means the station does not exist at all.
    pub fn from_candidates(candidates: Vec<String>) -> Self {
        if candidates.is_empty() {
            Response::Failure(QueryFailure::NotFound)
        } else {
            Response::Failure(QueryFailure::Ambiguous(candidates))
        }
    }

    /// The station does not exist.
    pub fn not_found() -> Self {
        Response::Failure(QueryFailure::NotFound)
    }

    /// A failure carrying a backend error message verbatim.
    pub fn from_error(message: impl Into<String>) -> Self {
        Response::Failure(QueryFailure::Error(message.into()))
    }

    /// Fold a [`QueryOutcome`] into a response.
    ///
    /// Departure records become [`Departure`]s with the queried station as
    /// origin and `since` as the countdown reference; a time-normalization
    /// error propagates unchanged.
    pub fn from_outcome(
        station: impl Into<String>,
        outcome: QueryOutcome,
        since: NaiveDateTime,
    ) -> Result<Self, TimeError> {
        match outcome {
            QueryOutcome::Candidates(names) => Ok(Self::from_candidates(names)),
            QueryOutcome::Departures(records) => {
                let station = station.into();
                let departures = records
                    .into_iter()
                    .map(|record| {
                        Departure::with_since(
                            station.clone(),
                            record.destination,
                            record.when,
                            record.line,
                            since,
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::success(station, departures))
            }
        }
    }

    /// Whether the query resolved.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// Whether the query failed.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The accumulated per-station boards; `None` on failure.
    pub fn boards(&self) -> Option<&[StationBoard]> {
        match self {
            Response::Success { boards } => Some(boards),
            Response::Failure(_) => None,
        }
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&QueryFailure> {
        match self {
            Response::Success { .. } => None,
            Response::Failure(failure) => Some(failure),
        }
    }

    /// The failure text, if any. Formats are stable:
    /// `"Station is ambiguous: {names}"`, `"Station does not exist"`, or
    /// the backend message verbatim.
    pub fn error_message(&self) -> Option<String> {
        self.failure().map(QueryFailure::to_string)
    }

    /// Append `other`'s boards to this response, in merge order.
    ///
    /// Both sides must be successes; the error names the side that was
    /// not. `other` is consumed, so a response can only ever be merged
    /// into one aggregate.
    pub fn merge(&mut self, other: Response) -> Result<(), MergeError> {
        if let Response::Failure(failure) = &*self {
            return Err(MergeError::SelfFailed(failure.to_string()));
        }
        match other {
            Response::Failure(failure) => Err(MergeError::OtherFailed(failure.to_string())),
            Response::Success { boards: theirs } => {
                if let Response::Success { boards } = self {
                    boards.extend(theirs);
                }
                Ok(())
            }
        }
    }

    /// Serialize to the JSON wire shape.
    ///
    /// Success: `[[station, [{"start", "line", "end", "remaining"}, ..]], ..]`,
    /// one pair per merged board, departure keys in exactly that order.
    /// Failure: the failure text as a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Response::Success { boards } => boards.serialize(serializer),
            Response::Failure(failure) => serializer.serialize_str(&failure.to_string()),
        }
    }
}
