//! Fetch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Base URL rejected before any request was made.
    #[display("invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },
    /// Relative path is empty, contains invalid characters or escapes the base
    #[display("invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// The target does not serve this file
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The target answered with a non-success status
    #[display("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
    /// No complete response within the allowed time
    #[display("timed out: {_0}")]
    Timeout(#[error(not(source))] String),
    /// Connection, TLS or protocol failure
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
