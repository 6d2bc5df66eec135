//! Release identities and per-release asset listings.
//!
//! A listing records, for one known release, the content hash of every static
//! asset it ships. This crate parses release identifiers, loads listings into
//! [`Manifest`]s (dropping paths that make poor fingerprints) and can produce
//! listings from unpacked release trees.

pub mod error;
mod filter;
mod hash;
mod loader;
mod manifest;
mod producer;
mod release;

pub use crate::filter::{DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS, PathFilter};
pub use crate::hash::ContentHash;
pub use crate::loader::{Loader, parse_listing};
pub use crate::manifest::{Manifest, ManifestSet};
pub use crate::producer::{DEFAULT_HASH_FOLDERS, Producer, ReleaseTree};
pub use crate::release::{Edition, Release};
