//! Error types for prompt-scraper
//!
//! This module provides the error taxonomy for the scrape core:
//! - Crate-level [`Error`] used by persistence, configuration and orchestration
//! - [`DatabaseError`] for the SQLite persistence layer
//! - [`ExecutionError`] for the outcome of one resilient outbound call
//!
//! Only configuration and persistence failures are fatal to a batch. Every
//! [`ExecutionError`] is converted into a failed task entry by the scrape unit.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for prompt-scraper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for prompt-scraper
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "platform_type")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Outbound call failed after the executor gave up
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Network error outside the resilient executor (e.g. client construction)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A header value could not be encoded (control characters in a key, etc.)
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),

    /// Task status update would move the lifecycle backwards
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Task whose status was being updated
        task_id: i64,
        /// Current stored status
        from: String,
        /// Requested status
        to: String,
    },
}

/// Failure of one resilient outbound call
///
/// Produced by [`ResilientExecutor::send`](crate::executor::ResilientExecutor::send).
/// Whether a variant is worth another attempt is decided by
/// [`IsRetryable`](crate::retry::IsRetryable).
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The request did not complete within its per-attempt timeout
    #[error(
        "request timed out after {attempts} attempt(s) (last timeout {timeout:?}); \
         consider lowering the thinking level or disabling search"
    )]
    Timeout {
        /// Attempts made, including the last one
        attempts: u32,
        /// Timeout that applied to the final attempt
        timeout: Duration,
    },

    /// The endpoint answered with a 4xx status
    #[error("client error {status}: {body}")]
    ClientStatus {
        /// HTTP status code
        status: StatusCode,
        /// Response body text
        body: String,
    },

    /// The endpoint answered with a non-200, non-4xx status
    #[error("server error {status} after {attempts} attempt(s): {body}")]
    ServerStatus {
        /// HTTP status code
        status: StatusCode,
        /// Response body text
        body: String,
        /// Attempts made so far
        attempts: u32,
    },

    /// A 200 response whose body was not valid JSON
    #[error("response body is not valid JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// Headers for an attempt could not be built
    #[error("request could not be built: {0}")]
    InvalidRequest(String),

    /// Connection-level failure other than a timeout
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}
