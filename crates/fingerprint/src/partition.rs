//! Discriminator ranking.
//!
//! For every file seen in any manifest, releases are partitioned by the hash
//! they exhibit for it. Files that take many different values across releases
//! discriminate better than files that barely change, so they rank first.

use relprint_manifest::{ContentHash, ManifestSet, Release};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

/// Releases grouped by the hash they exhibit for one file.
///
/// Every release shipping the file sits in exactly one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePartition {
    path: String,
    groups: BTreeMap<ContentHash, Vec<Release>>,
}
impl FilePartition {
    fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), groups: BTreeMap::new() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Releases exhibiting `hash`, if any do.
    pub fn group(&self, hash: &ContentHash) -> Option<&[Release]> {
        self.groups.get(hash).map(Vec::as_slice)
    }

    /// Number of releases sharing `hash` (zero when unknown).
    pub fn group_size(&self, hash: &ContentHash) -> usize {
        self.groups.get(hash).map_or(0, Vec::len)
    }

    /// Number of distinct hash groups: the discriminating power of the file.
    pub fn distinct_hashes(&self) -> usize {
        self.groups.len()
    }

    /// Number of releases shipping this file.
    pub fn release_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&ContentHash, &[Release])> {
        self.groups.iter().map(|(hash, releases)| (hash, releases.as_slice()))
    }
}

/// File partitions ordered from most to least discriminating.
///
/// Files with equal discriminating power keep the order in which they were
/// first seen (releases in order, each manifest in listing order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    files: Vec<FilePartition>,
    positions: HashMap<String, usize>,
}
impl Ranking {
    #[instrument(level = "debug", skip_all, fields(releases = manifests.len()))]
    pub fn new(manifests: &ManifestSet) -> Self {
        let mut files: Vec<FilePartition> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (release, manifest) in manifests.iter() {
            for (path, hash) in manifest.files() {
                let position = *seen.entry(path).or_insert_with(|| {
                    files.push(FilePartition::new(path));
                    files.len() - 1
                });
                files[position].groups.entry(hash.clone()).or_default().push(release.clone());
            }
        }
        files.sort_by_key(|file| Reverse(file.distinct_hashes()));
        let positions = files.iter().enumerate().map(|(i, file)| (file.path.clone(), i)).collect();
        tracing::debug!(files = files.len(), "Ranked files by distinct hashes");
        Self { files, positions }
    }

    pub fn files(&self) -> &[FilePartition] {
        &self.files
    }

    /// Rank of `path`, where 0 is the most discriminating file.
    pub fn position(&self, path: &str) -> Option<usize> {
        self.positions.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
