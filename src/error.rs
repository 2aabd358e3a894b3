//! Error types for the farm core
//!
//! Nothing here is fatal to a session:
//! - StoreError: backend failures, logged by the store adapter and swallowed
//! - ServiceError: external collaborator failures, degraded to empty results
//! - FarmError: mutation API failures (unknown ids), returned to the caller

use thiserror::Error;

/// Failures from a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,
}

/// Failures from the generative text service or the email sink.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Service rate limit exceeded")]
    RateLimited,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Service returned an HTML page instead of data")]
    HtmlResponse,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Returns true if the same call might succeed later.
    ///
    /// Only used for display; calls are never retried.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Network(_) | ServiceError::Timeout(_) | ServiceError::RateLimited => {
                true
            }
            ServiceError::Http { status, .. } => *status >= 500,
            ServiceError::Configuration(_)
            | ServiceError::HtmlResponse
            | ServiceError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(crate::intelligence::REQUEST_TIMEOUT_SECS)
        } else if err.is_decode() {
            ServiceError::Malformed(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Failures from the `FarmState` mutation API.
#[derive(Debug, Error)]
pub enum FarmError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl FarmError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        FarmError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Serializable failure summary for a finished external call.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFailure {
    pub message: String,
    pub transient: bool,
}

impl From<&ServiceError> for CallFailure {
    fn from(err: &ServiceError) -> Self {
        CallFailure {
            message: err.to_string(),
            transient: err.is_transient(),
        }
    }
}
