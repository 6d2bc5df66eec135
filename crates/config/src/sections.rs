use relprint_fetch::fetcher::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use relprint_fingerprint::{Builder, DEFAULT_ACCURACY_STEP};
use relprint_manifest::{DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS, DEFAULT_HASH_FOLDERS, Loader, PathFilter, Producer};
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Where listings live and which of their paths are trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestsConfig {
    pub directory: PathBuf,
    /// Listing file name prefix; the rest of the name is the release key.
    pub prefix: String,
    /// Only paths with these extensions are used as fingerprints.
    pub extensions: Vec<String>,
    /// Paths below a directory with one of these names are ignored.
    pub excluded_dirs: Vec<String>,
}
impl ManifestsConfig {
    pub fn filter(&self) -> PathFilter {
        PathFilter::new(&self.extensions, &self.excluded_dirs)
    }

    pub fn loader(&self) -> Loader {
        Loader::new(self.prefix.clone(), self.filter())
    }
}
impl Default for ManifestsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("md5"),
            prefix: "magento-".to_string(),
            extensions: strings(&DEFAULT_EXTENSIONS),
            excluded_dirs: strings(&DEFAULT_EXCLUDED_DIRS),
        }
    }
}

/// Unpacked release trees that listings are generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleasesConfig {
    pub directory: PathBuf,
    pub hash_folders: Vec<String>,
}
impl ReleasesConfig {
    /// Producer writing listings named with the manifests' `prefix`.
    pub fn producer(&self, manifests: &ManifestsConfig) -> Producer {
        Producer::new(manifests.prefix.clone(), self.hash_folders.iter().cloned())
    }
}
impl Default for ReleasesConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from("release"), hash_folders: strings(&DEFAULT_HASH_FOLDERS) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Passes between each increase in tolerance.
    pub accuracy_step: u32,
    /// Where the database is written to and read from.
    pub database: PathBuf,
}
impl FingerprintConfig {
    pub fn builder(&self) -> Builder {
        Builder::new(NonZeroU32::new(self.accuracy_step).unwrap_or(NonZeroU32::MIN))
    }
}
impl Default for FingerprintConfig {
    fn default() -> Self {
        Self { accuracy_step: DEFAULT_ACCURACY_STEP, database: PathBuf::from("version.json") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Deadline for each individual fetch.
    pub timeout_secs: u64,
    /// Fetches allowed in flight at once.
    pub concurrency: usize,
    pub user_agent: String,
}
impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn concurrency(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.concurrency).unwrap_or(NonZeroUsize::MIN)
    }
}
impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            concurrency: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
