//! Unreliable path filtering.
//!
//! Only static assets that are served verbatim make stable fingerprints.
//! Everything else is dropped from a listing before it reaches the builder.

use std::path::{Component, Path};

/// Default whitelist of static asset extensions.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["js", "css"];
/// Default theme variant directories whose contents are never trusted.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 1] = ["rwd"];

/// Decides which listed paths are stable enough to fingerprint.
///
/// A path is kept when its extension is whitelisted (case-insensitive) and
/// none of its parent directories is an excluded theme variant segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
}
impl PathFilter {
    pub fn new(
        extensions: impl IntoIterator<Item = impl Into<String>>,
        excluded_dirs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            excluded_dirs: excluded_dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn excluded_dirs(&self) -> &[String] {
        &self.excluded_dirs
    }

    /// Returns `true` if the path should contribute to fingerprints.
    pub fn is_reliable(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let whitelisted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)));
        if !whitelisted {
            return false;
        }
        let Some(parent) = path.parent() else {
            return true;
        };
        !parent.components().any(|component| match component {
            Component::Normal(segment) => self.excluded_dirs.iter().any(|dir| segment == dir.as_str()),
            _ => false,
        })
    }
}
impl Default for PathFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS, DEFAULT_EXCLUDED_DIRS)
    }
}
