//! Layered configuration.
//!
//! Values are merged from, in increasing priority:
//! 1. built-in defaults,
//! 2. a config file (TOML, YAML or JSON, picked by extension),
//! 3. environment variables prefixed `RELPRINT_`, with `__` between nested
//!    keys (`RELPRINT_RESOLVER__CONCURRENCY=4`).
//!
//! Without an explicit file, `config.toml` in the platform config directory
//! is used when present.

pub mod error;
mod sections;

pub use crate::sections::{FingerprintConfig, ManifestsConfig, ReleasesConfig, ResolverConfig};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "RELPRINT_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub manifests: ManifestsConfig,
    pub releases: ReleasesConfig,
    pub fingerprint: FingerprintConfig,
    pub resolver: ResolverConfig,
}
impl Config {
    /// Load and validate configuration.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|path| path.is_file()),
        };
        match &file {
            Some(file) => tracing::debug!(path = %file.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file, using defaults and environment"),
        }
        Self::from_figment(Self::figment(file.as_deref())?)
    }

    /// Defaults, then `file` if given, then the environment.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file_exact(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
                Some("json") => figment.merge(Json::file_exact(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fingerprint.accuracy_step == 0 {
            exn::bail!(ErrorKind::Invalid("fingerprint.accuracy_step must be at least 1".to_string()));
        }
        if self.resolver.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("resolver.concurrency must be at least 1".to_string()));
        }
        if self.resolver.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("resolver.timeout_secs must be at least 1".to_string()));
        }
        if self.manifests.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            exn::bail!(ErrorKind::Invalid("manifests.extensions must name at least one extension".to_string()));
        }
        Ok(())
    }
}

/// `config.toml` in the platform config directory, if one can be determined.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "relprint").map(|dirs| dirs.config_dir().join("config.toml"))
}
