//! Fingerprint Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A fingerprint error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fingerprint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing to fingerprint: no release has a usable manifest.
    #[display("no releases with usable manifests were found")]
    NoReleases,
    /// The database could not be encoded.
    #[display("failed to serialize fingerprint database")]
    Serialize,
    /// The document is not a valid fingerprint database.
    #[display("invalid fingerprint database")]
    Deserialize,
    /// The database could not be written to disk.
    #[display("cannot write fingerprint database: {}", _0.display())]
    Persist(#[error(not(source))] PathBuf),
    /// The database could not be read from disk.
    #[display("cannot read fingerprint database: {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persist(_) | Self::Read(_))
    }
}
