//! Per-fetch deadline.
//!
//! Wraps another fetcher so that a request which never completes is reported
//! as a [`Timeout`](crate::error::ErrorKind::Timeout) instead of stalling the
//! caller.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{ErrorKind, Result};
use crate::fetcher::Fetcher;
use crate::url::BaseUrl;
use crate::FetcherHandle;

/// Bounds every fetch of the wrapped fetcher by a fixed duration.
#[derive(Clone)]
pub struct TimeoutFetcher {
    inner: FetcherHandle,
    limit: Duration,
}
impl TimeoutFetcher {
    pub fn new(inner: FetcherHandle, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[async_trait]
impl Fetcher for TimeoutFetcher {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, base: &BaseUrl, path: &str) -> Result<Vec<u8>> {
        match tokio::time::timeout(self.limit, self.inner.fetch(base, path)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(fetcher = self.inner.name(), path, limit = ?self.limit, "Fetch exceeded deadline");
                exn::bail!(ErrorKind::Timeout(format!("{base}{path}")))
            },
        }
    }
}
