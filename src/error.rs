//! Error types for trip-eta

use std::time::Duration;
use thiserror::Error;

/// Main error type for trip-eta operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Routing service rate limit hit (HTTP 429)")]
    RateLimited,

    #[error("Routing request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid estimate: {0}")]
    InvalidEstimate(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for trip-eta operations
pub type Result<T> = std::result::Result<T, Error>;
