//! Manifest Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The directory holding the listings could not be enumerated at all.
    #[display("cannot read listing directory: {}", _0.display())]
    DirectoryUnreadable(#[error(not(source))] PathBuf),
    /// A single listing could not be read. Loaders skip these.
    #[display("cannot read listing: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// Release identifier is not of the form `EDITION-VERSION`.
    #[display("invalid release identifier: {_0}")]
    InvalidRelease(#[error(not(source))] String),
    /// Not a 32 character lowercase hex digest.
    #[display("invalid content hash: {_0}")]
    InvalidHash(#[error(not(source))] String),
    /// Unpacked release tree is missing.
    #[display("release tree not found: {}", _0.display())]
    ReleaseNotFound(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Unreadable(_) | Self::DirectoryUnreadable(_))
    }
}
