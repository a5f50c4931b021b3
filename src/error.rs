//! Error Types
//!
//! Defines the error taxonomy for the sync engine. Remote failures during
//! entity mutations are never surfaced to the caller (they fall back to the
//! pending queue); only the online-only entry points (`manual_sync`,
//! `refresh_from_server`) and local storage failures propagate.
//!
//! # Error Categories
//!
//! - `RemoteError` - HTTP/remote data service failures
//! - `SyncError` - top-level errors surfaced by the sync manager
use thiserror::Error;

/// Result type used throughout the sync engine
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type for remote data service calls
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Failures talking to the remote data service
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status
    #[error("remote returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// The remote answered but the payload could not be decoded
    #[error("failed to decode remote response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Errors surfaced by the sync manager
#[derive(Debug, Error)]
pub enum SyncError {
    /// Online-only entry point invoked while offline
    #[error("cannot sync while offline")]
    Offline,

    /// Withdrawal would drive the unit's balance negative
    #[error("withdrawal of {requested} exceeds available balance of {available}")]
    InsufficientBalance {
        /// Current balance of the unit
        available: f64,
        /// Requested withdrawal amount
        requested: f64,
    },

    /// Referenced neighborhood unit does not exist in the local cache
    #[error("unknown neighborhood unit: {0}")]
    UnknownRt(String),

    /// Local cache store failure; fatal to the operation, never swallowed
    #[error("local storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Remote failure propagated from an online-only entry point
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Pending-entry payload could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
