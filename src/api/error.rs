//! Backend errors

use thiserror::Error;

/// Anything that makes a backend call fail.
///
/// To the operator all of these are the same network failure; the variants
/// only exist so the log says what actually happened.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or the connection dropped
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },

    /// Response body did not have the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
