//! Release identification for live deployments.
//!
//! A [`Resolver`] walks a [`FingerprintDatabase`](relprint_fingerprint::FingerprintDatabase)
//! in stored order, fetching each recorded file from the target and hashing
//! what it serves, until one hash is known.

pub mod error;
mod identification;
mod resolver;

pub use crate::identification::{Identification, Match};
pub use crate::resolver::Resolver;
