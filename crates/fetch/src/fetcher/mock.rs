//! In-memory fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{ErrorKind, Result};
use crate::fetcher::Fetcher;
use crate::path::validate as validate_path;
use crate::url::BaseUrl;

/// In-memory fetcher for testing.
///
/// Serves fixed bodies by relative path regardless of the base URL, and
/// records every requested path so tests can assert on probe order. Paths can
/// be made to fail with a chosen error or to respond only after a delay.
pub struct MockFetcher {
    name: String,
    files: HashMap<String, Vec<u8>>,
    failures: HashMap<String, ErrorKind>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Create a mock fetcher serving the given files.
    ///
    /// Panics if any path fails validation. If test setup is wrong, then test
    /// should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let files = files.into_iter().map(|(path, data)| (checked(path.into()), data.into())).collect();
        Self {
            name: "mock".to_string(),
            files,
            failures: HashMap::new(),
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fail every fetch of `path` with `kind`.
    pub fn with_failure(mut self, path: impl Into<String>, kind: ErrorKind) -> Self {
        self.failures.insert(checked(path.into()), kind);
        self
    }

    /// Respond to fetches of `path` only after `delay`.
    pub fn with_delay(mut self, path: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(checked(path.into()), delay);
        self
    }

    /// Every requested path so far, in the order requests started.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}
impl Default for MockFetcher {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

fn checked(path: String) -> String {
    let Ok(validated) = validate_path(&path) else {
        // Deliberate: a broken fixture should fail the test that uses it.
        panic!("MockFetcher: invalid path {path}");
    };
    validated
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, base: &BaseUrl, path: &str) -> Result<Vec<u8>> {
        let url = base.join(path)?;
        let path = validate_path(path)?;
        self.requests.lock().await.push(path.clone());
        if let Some(delay) = self.delays.get(&path) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(kind) = self.failures.get(&path) {
            exn::bail!(kind.clone());
        }
        self.files.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(url)))
    }
}
