//! The query contract and its result model.
//!
//! A concrete data source implements [`QueryApi`]; the single `call`
//! operation either resolves a station to an ordered list of raw board
//! rows or reports the candidate names the upstream offered instead.
//! Callers fold the outcome into a [`Response`].

mod error;
mod response;

pub use error::QueryError;
pub use response::{MergeError, QueryFailure, Response, StationBoard};

use std::future::Future;

use crate::domain::When;

/// One raw row of an upstream departure board.
///
/// Carries just enough to build a [`crate::domain::Departure`]: the origin
/// is the queried station and the reference instant is supplied by the
/// caller at fold time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRecord {
    /// Destination station name as printed on the board.
    pub destination: String,
    /// Route or line identifier.
    pub line: String,
    /// Scheduled time in whatever shape the source produced.
    pub when: When,
}

/// What an upstream query produced for one station name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The station resolved; rows in board order.
    Departures(Vec<DepartureRecord>),
    /// The station did not resolve. Several names mean it was ambiguous,
    /// none mean it does not exist.
    Candidates(Vec<String>),
}

/// The single capability a departure data source must provide.
///
/// Transport failures surface as [`QueryError`]; ambiguous or unknown
/// stations are data ([`QueryOutcome::Candidates`]), never errors.
pub trait QueryApi {
    /// Issue the upstream query once and classify the answer.
    fn call(&self) -> impl Future<Output = Result<QueryOutcome, QueryError>> + Send;
}
