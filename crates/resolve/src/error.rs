//! Resolve Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Failures fetching individual files
//! are absorbed by the resolver and never surface here.

use derive_more::{Display, Error};

/// A resolve error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for resolve operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The base URL was rejected; nothing was fetched.
    #[display("cannot probe {_0:?}: not a valid base URL")]
    InvalidUrl(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
