//! Retrieval of static assets from a deployed site.
//!
//! The resolver only needs bytes for a `(base URL, relative path)` pair; this
//! crate supplies the [`Fetcher`] seam, validation of both halves of that
//! pair, an HTTP implementation and a deadline decorator.

pub mod error;
pub mod fetcher;
mod path;
mod url;

pub use crate::fetcher::Fetcher;
pub use crate::path::validate as validate_path;
pub use crate::url::BaseUrl;
use std::sync::Arc;

pub type FetcherHandle = Arc<dyn Fetcher + Send + Sync>;
