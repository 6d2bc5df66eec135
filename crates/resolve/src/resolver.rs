//! Version resolution against a live deployment.
//!
//! Files are probed in database order and the first file whose served content
//! hashes to a recorded value decides the answer. With a look-ahead window
//! larger than one, later fetches start early, but responses are still
//! examined strictly in database order so the answer never depends on which
//! request finishes first.

use exn::ResultExt;
use futures::StreamExt;
use relprint_fetch::{BaseUrl, FetcherHandle};
use relprint_fingerprint::FingerprintDatabase;
use relprint_manifest::ContentHash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::identification::{Identification, Match};

#[derive(Clone)]
pub struct Resolver {
    database: Arc<FingerprintDatabase>,
    fetcher: FetcherHandle,
    concurrency: NonZeroUsize,
}
impl Resolver {
    /// Probe one file at a time.
    pub fn new(database: impl Into<Arc<FingerprintDatabase>>, fetcher: FetcherHandle) -> Self {
        Self { database: database.into(), fetcher, concurrency: NonZeroUsize::MIN }
    }

    /// Allow up to `concurrency` fetches in flight.
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn database(&self) -> &FingerprintDatabase {
        &self.database
    }

    /// Identify the release deployed at `base`.
    ///
    /// `base` is validated before anything is fetched. Files that cannot be
    /// fetched count as non-matches.
    #[instrument(skip(self), fields(fetcher = self.fetcher.name(), concurrency = self.concurrency.get()))]
    pub async fn identify(&self, base: &str) -> Result<Identification> {
        let base = base.parse::<BaseUrl>().or_raise(|| ErrorKind::InvalidUrl(base.to_string()))?;
        Ok(self.identify_url(&base).await)
    }

    /// Identify the release deployed at an already validated `base`.
    pub async fn identify_url(&self, base: &BaseUrl) -> Identification {
        let fetcher = &self.fetcher;
        let mut probes = futures::stream::iter(self.database.files())
            .map(|file| async move { (file, fetcher.fetch(base, file.path()).await) })
            .buffered(self.concurrency.get());

        while let Some((file, fetched)) = probes.next().await {
            let body = match fetched {
                Ok(body) => body,
                Err(err) => {
                    tracing::debug!(path = file.path(), error = %err, "Fetch failed, trying next file");
                    continue;
                },
            };
            let hash = ContentHash::compute(&body);
            match file.get(&hash) {
                Some(candidates) => {
                    tracing::info!(path = file.path(), %hash, releases = candidates.len(), "Deployment matched");
                    return Identification::Matched(Match {
                        path: file.path().to_string(),
                        hash,
                        candidates: candidates.clone(),
                    });
                },
                None => tracing::debug!(path = file.path(), %hash, "Unknown content hash"),
            }
        }
        tracing::info!(probed = self.database.len(), "No file matched");
        Identification::Unidentified
    }
}
