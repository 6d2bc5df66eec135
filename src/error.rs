//! Command Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded or is invalid.
    #[display("configuration error")]
    Config,
    /// Release trees could not be enumerated.
    #[display("cannot read release directory: {}", _0.display())]
    Releases(#[error(not(source))] PathBuf),
    /// Some listings could not be generated; the rest were written.
    #[display("failed to generate {_0} listing(s)")]
    Generate(#[error(not(source))] usize),
    /// Listing directory could not be enumerated.
    #[display("cannot read listings: {}", _0.display())]
    Manifests(#[error(not(source))] PathBuf),
    /// Nothing usable to build a database from.
    #[display("no releases found in {}", _0.display())]
    NoReleases(#[error(not(source))] PathBuf),
    /// The built database could not be written.
    #[display("cannot persist fingerprint database to {}", _0.display())]
    Persist(#[error(not(source))] PathBuf),
    /// The database to resolve against could not be loaded.
    #[display("cannot load fingerprint database from {}", _0.display())]
    Database(#[error(not(source))] PathBuf),
    /// HTTP client could not be set up.
    #[display("cannot initialise fetcher")]
    Fetcher,
    /// The URL to check was rejected.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}
