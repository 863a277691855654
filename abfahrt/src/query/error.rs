//! Backend transport errors.
//!
//! These cover the request itself failing. A station that is ambiguous or
//! unknown is not an error; it travels through
//! [`QueryOutcome`](super::QueryOutcome) as data.

/// Errors from a concrete query backend.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response body
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
