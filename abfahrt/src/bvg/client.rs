//! BVG HTTP client and the concrete departure query.

use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::query::{QueryApi, QueryError, QueryOutcome};

use super::types::{DeparturesResponse, LocationDto};

/// Default base URL for the BVG HAFAS REST API.
const DEFAULT_BASE_URL: &str = "https://v6.bvg.transport.rest";

/// Default number of location candidates to request.
const DEFAULT_RESULTS: u8 = 8;

/// Default board window in minutes.
const DEFAULT_DURATION_MINS: u16 = 60;

/// Configuration for the BVG client.
#[derive(Debug, Clone)]
pub struct BvgConfig {
    /// Base URL for the API (defaults to the public instance)
    pub base_url: String,
    /// Number of location candidates to request
    pub results: u8,
    /// Board window in minutes
    pub duration_mins: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BvgConfig {
    /// Create a config with the public-instance defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            results: DEFAULT_RESULTS,
            duration_mins: DEFAULT_DURATION_MINS,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the number of location candidates to request.
    pub fn with_results(mut self, results: u8) -> Self {
        self.results = results;
        self
    }

    /// Set the board window.
    pub fn with_duration(mut self, mins: u16) -> Self {
        self.duration_mins = mins;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for BvgConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the BVG HAFAS REST API.
#[derive(Debug, Clone)]
pub struct BvgClient {
    http: reqwest::Client,
    base_url: String,
    results: u8,
    duration_mins: u16,
}

impl BvgClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BvgConfig) -> Result<Self, QueryError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            results: config.results,
            duration_mins: config.duration_mins,
        })
    }

    /// Search stops matching a station name.
    async fn locations(&self, query: &str) -> Result<Vec<LocationDto>, QueryError> {
        let url = format!("{}/locations", self.base_url);
        debug!(query, "searching locations");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query.to_string()),
                ("results", self.results.to_string()),
                ("stops", "true".to_string()),
                ("addresses", "false".to_string()),
                ("poi", "false".to_string()),
            ])
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Fetch the departure board of a resolved stop.
    async fn departures(&self, stop_id: &str) -> Result<DeparturesResponse, QueryError> {
        let url = format!("{}/stops/{}/departures", self.base_url, stop_id);
        debug!(stop_id, "fetching departure board");

        let response = self
            .http
            .get(&url)
            .query(&[("duration", self.duration_mins.to_string())])
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, QueryError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| QueryError::Json {
            message: e.to_string(),
        })
    }
}

/// How a location search resolves a station name.
#[derive(Debug, PartialEq, Eq)]
enum StationMatch {
    /// Nothing matched.
    None,
    /// A single queryable stop.
    One { id: String, name: String },
    /// Several stops; candidate names in upstream order.
    Many(Vec<String>),
}

/// Classify a location search result against the queried name.
///
/// A single stop wins outright. Among several, an exact (case-insensitive)
/// name hit is not ambiguous; otherwise all names are candidates.
fn classify_locations(query: &str, locations: Vec<LocationDto>) -> StationMatch {
    let mut stops: Vec<(String, String)> = locations
        .into_iter()
        .filter(LocationDto::is_stop)
        .filter_map(|location| Some((location.id?, location.name?)))
        .collect();

    match stops.len() {
        0 => StationMatch::None,
        1 => {
            let (id, name) = stops.remove(0);
            StationMatch::One { id, name }
        }
        _ => {
            let wanted = query.trim().to_lowercase();
            if let Some((id, name)) = stops
                .iter()
                .find(|(_, name)| name.to_lowercase() == wanted)
            {
                StationMatch::One {
                    id: id.clone(),
                    name: name.clone(),
                }
            } else {
                StationMatch::Many(stops.into_iter().map(|(_, name)| name).collect())
            }
        }
    }
}

/// Live departure query for one named station.
///
/// This is the concrete [`QueryApi`] backend: it resolves the station
/// name, then fetches and converts its departure board.
#[derive(Debug, Clone)]
pub struct ActualDepartureQuery {
    client: BvgClient,
    station: String,
}

impl ActualDepartureQuery {
    /// Create a query for a station name.
    pub fn new(client: BvgClient, station: impl Into<String>) -> Self {
        Self {
            client,
            station: station.into(),
        }
    }

    /// The queried station name.
    pub fn station(&self) -> &str {
        &self.station
    }
}

impl QueryApi for ActualDepartureQuery {
    fn call(&self) -> impl Future<Output = Result<QueryOutcome, QueryError>> + Send {
        async move {
            let locations = self.client.locations(&self.station).await?;

            let (id, name) = match classify_locations(&self.station, locations) {
                StationMatch::None => return Ok(QueryOutcome::Candidates(Vec::new())),
                StationMatch::Many(names) => return Ok(QueryOutcome::Candidates(names)),
                StationMatch::One { id, name } => (id, name),
            };

            let board = self.client.departures(&id).await?;
            debug!(station = %name, rows = board.departures.len(), "board fetched");

            let mut records = Vec::with_capacity(board.departures.len());
            for row in board.departures {
                match row.into_record() {
                    Some(record) => records.push(record),
                    None => warn!(station = %name, "skipping board row without a departure time"),
                }
            }

            Ok(QueryOutcome::Departures(records))
        }
    }
}
