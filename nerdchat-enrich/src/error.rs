//! Error types for nerdchat-enrich
//!
//! None of these reach the conversation layer: every pipeline path ends in
//! either a document or `None`. They exist so failures can be logged with
//! their cause before being absorbed.

use thiserror::Error;

/// Outbound fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, TLS failure, ...
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response arrived but the body could not be read
    #[error("Body read error: {0}")]
    Body(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(err.to_string())
        } else if err.is_builder() {
            FetchError::Client(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Durable key-value store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error (file backend)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error (SQLite backend)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
