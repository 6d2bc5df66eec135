//! Listing generation from unpacked release trees.
//!
//! Each release is expected under `<releases>/<EDITION-VERSION>/`, optionally
//! carrying the listing prefix (`<releases>/magento-CE-1.9.0.0/`). Every file
//! below one of the configured hash folders is hashed and written to a
//! listing that [`Loader`](crate::Loader) can read back.

use exn::ResultExt;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;
use walkdir::WalkDir;

use crate::error::{ErrorKind, Result};
use crate::hash::ContentHash;
use crate::release::Release;

/// Default top-level folders whose files are worth hashing.
pub const DEFAULT_HASH_FOLDERS: [&str; 3] = ["js", "media", "skin"];

/// An unpacked release and the directory it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTree {
    pub release: Release,
    pub root: PathBuf,
}

/// Writes a listing per unpacked release.
#[derive(Debug, Clone)]
pub struct Producer {
    hash_folders: Vec<String>,
    prefix: String,
}
impl Producer {
    pub fn new(prefix: impl Into<String>, hash_folders: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            hash_folders: hash_folders.into_iter().map(Into::into).collect(),
            prefix: prefix.into(),
        }
    }

    /// Release trees found directly below `releases`, in release order.
    ///
    /// Directory names may carry the listing prefix. Directories whose name is
    /// not a release identifier are skipped, as is a second tree for a release
    /// already found.
    pub fn discover(&self, releases: &Path) -> Result<Vec<ReleaseTree>> {
        let entries = fs::read_dir(releases).or_raise(|| ErrorKind::DirectoryUnreadable(releases.to_path_buf()))?;
        let mut found: BTreeMap<Release, PathBuf> = BTreeMap::new();
        for entry in entries {
            let entry = entry.or_raise(|| ErrorKind::DirectoryUnreadable(releases.to_path_buf()))?;
            let root = entry.path();
            if !root.is_dir() {
                continue;
            }
            let Some(release) = entry.file_name().to_str().and_then(|name| self.release_name(name)) else {
                tracing::warn!(path = %root.display(), "Skipping directory that is not a release");
                continue;
            };
            match found.entry(release) {
                Entry::Vacant(slot) => {
                    slot.insert(root);
                },
                Entry::Occupied(slot) => {
                    tracing::warn!(path = %root.display(), kept = %slot.get().display(), "Skipping duplicate release tree");
                },
            }
        }
        Ok(found.into_iter().map(|(release, root)| ReleaseTree { release, root }).collect())
    }

    fn release_name(&self, name: &str) -> Option<Release> {
        name.strip_prefix(self.prefix.as_str()).unwrap_or(name).parse().ok()
    }

    /// Produce the listing lines for one release tree.
    ///
    /// Paths are relative to the release root, use forward slashes, and are
    /// sorted so that the output is stable between runs. Hash folders missing
    /// from the tree are skipped.
    pub fn listing(&self, root: &Path) -> Result<String> {
        if !root.is_dir() {
            exn::bail!(ErrorKind::ReleaseNotFound(root.to_path_buf()));
        }
        let mut lines: Vec<(String, ContentHash)> = Vec::new();
        for folder in &self.hash_folders {
            let base = root.join(folder);
            if !base.is_dir() {
                tracing::debug!(folder = %base.display(), "Hash folder absent from release");
                continue;
            }
            for entry in WalkDir::new(&base).follow_links(false) {
                let entry = entry.or_raise(|| ErrorKind::Unreadable(base.clone()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let bytes = fs::read(entry.path()).or_raise(|| ErrorKind::Unreadable(entry.path().to_path_buf()))?;
                lines.push((relative(root, entry.path()), ContentHash::compute(&bytes)));
            }
        }
        lines.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(lines.into_iter().map(|(path, hash)| format!("{hash} {path}\n")).collect())
    }

    /// Hash one release tree and write its listing into `output`.
    ///
    /// Returns the path of the written listing.
    #[instrument(skip(self, tree, output), fields(release = %tree.release))]
    pub fn generate(&self, tree: &ReleaseTree, output: &Path) -> Result<PathBuf> {
        let release = &tree.release;
        let listing = self.listing(&tree.root)?;
        fs::create_dir_all(output).map_err(ErrorKind::Io)?;
        let target = output.join(format!("{}{release}", self.prefix));
        fs::write(&target, listing).map_err(ErrorKind::Io)?;
        tracing::debug!(listing = %target.display(), "Wrote listing");
        Ok(target)
    }
}
impl Default for Producer {
    fn default() -> Self {
        Self::new("", DEFAULT_HASH_FOLDERS)
    }
}

fn relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
