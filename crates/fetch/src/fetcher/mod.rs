//! Fetcher trait and implementations.
//!
//! A [`Fetcher`] turns a base URL and a relative asset path into the bytes the
//! target serves for it, or an explicit failure. Connection handling, TLS and
//! retries belong to the implementation; callers only see bytes or an error.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod timeout;

pub use self::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, HttpFetcher};
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockFetcher;
pub use self::timeout::TimeoutFetcher;
use crate::error::Result;
use crate::url::BaseUrl;
use async_trait::async_trait;

/// Retrieves static assets from a deployment.
///
/// # Path Handling
/// `path` is relative to `base` and must pass
/// [`validate_path`](crate::validate_path); implementations reject anything
/// else with [`InvalidPath`](crate::error::ErrorKind::InvalidPath) before
/// making a request.
///
/// # Examples
///
/// ```
/// use relprint_fetch::{BaseUrl, error::Result, fetcher::Fetcher};
///
/// async fn form_js_size(fetcher: &dyn Fetcher) -> Result<usize> {
///     let base: BaseUrl = "https://shop.example.com/".parse()?;
///     Ok(fetcher.fetch(&base, "js/varien/form.js").await?.len())
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Name of the fetcher, used for logging only.
    fn name(&self) -> &str;

    /// Fetch the complete body served for `path` below `base`.
    ///
    /// A missing file is [`NotFound`](crate::error::ErrorKind::NotFound);
    /// any other non-success response is
    /// [`Status`](crate::error::ErrorKind::Status).
    async fn fetch(&self, base: &BaseUrl, path: &str) -> Result<Vec<u8>>;
}
