//! Fingerprint database construction.
//!
//! Given the manifests of every known release, [`Builder`] picks for each
//! release one `(file, hash)` pair that identifies it, preferring pairs that
//! single out exactly one release and loosening only as passes accumulate.
//! The result is a [`FingerprintDatabase`] that a resolver probes in order.

mod builder;
mod database;
pub mod error;
mod partition;

pub use crate::builder::{Assignment, BuildReport, Builder, DEFAULT_ACCURACY_STEP};
pub use crate::database::{Candidates, FileFingerprints, FingerprintDatabase};
pub use crate::partition::{FilePartition, Ranking};
