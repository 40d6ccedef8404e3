//! Error types for the sheet sync pipeline
//!
//! Each collaborator seam has its own error enum; `MonitorError` is what
//! aborts a run.

use thiserror::Error;

/// Failures retrieving the spreadsheet export
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Sheet fetch failed {status}")]
    Status { status: u16 },

    #[error("Sheet fetch transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status {
                status: status.as_u16(),
            },
            None => FetchError::Transport(err.to_string()),
        }
    }
}

/// Signal store and audit sink failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Signal not found: {id}")]
    NotFound { id: String },

    #[error("Write conflict for {key}: record changed concurrently")]
    Conflict { key: String },

    #[error("Store operation '{op}' timed out after {secs}s")]
    Timeout { op: &'static str, secs: u64 },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Notification delivery failures. Never abort a run.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Telegram error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Notification transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Startup configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors that abort a reconciliation run
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
