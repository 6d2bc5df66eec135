//! The fingerprint database and its JSON form.
//!
//! ```json
//! {
//!     "js/varien/form.js": {
//!         "0cc175b9c0f1b6a831c399e269772661": {
//!             "Community": ["1.9.0.0", "1.9.0.1"]
//!         }
//!     }
//! }
//! ```
//!
//! Object key order is significant at every level: files are probed in the
//! order they appear, and hashes and editions keep insertion order.

use exn::ResultExt;
use relprint_manifest::{ContentHash, Edition, Release};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt::{Formatter, Result as FmtResult};
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use crate::error::{ErrorKind, Result};

/// Releases that share one discriminating hash, grouped by edition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    editions: Vec<(Edition, Vec<String>)>,
}
impl Candidates {
    pub fn push(&mut self, edition: Edition, version: impl Into<String>) {
        let version = version.into();
        match self.editions.iter_mut().find(|(existing, _)| *existing == edition) {
            Some((_, versions)) => versions.push(version),
            None => self.editions.push((edition, vec![version])),
        }
    }

    pub fn versions(&self, edition: Edition) -> Option<&[String]> {
        self.editions.iter().find(|(existing, _)| *existing == edition).map(|(_, versions)| versions.as_slice())
    }

    /// Editions in insertion order, each with its versions.
    pub fn iter(&self) -> impl Iterator<Item = (Edition, &[String])> {
        self.editions.iter().map(|(edition, versions)| (*edition, versions.as_slice()))
    }

    pub fn releases(&self) -> impl Iterator<Item = Release> + '_ {
        self.iter().flat_map(|(edition, versions)| versions.iter().map(move |v| Release::new(edition, v.clone())))
    }

    pub fn contains(&self, release: &Release) -> bool {
        self.versions(release.edition()).is_some_and(|versions| versions.iter().any(|v| v == release.version()))
    }

    /// Total number of releases across all editions.
    pub fn len(&self) -> usize {
        self.editions.iter().map(|(_, versions)| versions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl Serialize for Candidates {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.editions.iter().map(|(edition, versions)| (edition, versions)))
    }
}
impl<'de> Deserialize<'de> for Candidates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let OrderedMap(editions) = OrderedMap::<Edition, Vec<String>>::deserialize(deserializer)?;
        let candidates = Self { editions };
        if candidates.is_empty() {
            return Err(de::Error::custom("hash entry lists no releases"));
        }
        Ok(candidates)
    }
}

/// Every discriminating hash recorded for one file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprints {
    path: String,
    hashes: Vec<(ContentHash, Candidates)>,
}
impl FileFingerprints {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&Candidates> {
        self.hashes.iter().find(|(existing, _)| existing == hash).map(|(_, candidates)| candidates)
    }

    pub fn hashes(&self) -> impl Iterator<Item = (&ContentHash, &Candidates)> {
        self.hashes.iter().map(|(hash, candidates)| (hash, candidates))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}
impl Serialize for FileFingerprints {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.hashes.iter().map(|(hash, candidates)| (hash, candidates)))
    }
}

/// Mapping from file path to the hashes that identify releases.
///
/// A release is recorded under at most one `(path, hash)` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintDatabase {
    files: Vec<FileFingerprints>,
}
impl FingerprintDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `release` is identified by `path` having `hash`.
    pub fn assign(&mut self, path: &str, hash: &ContentHash, release: &Release) {
        let position = match self.files.iter().position(|file| file.path == path) {
            Some(position) => position,
            None => {
                self.files.push(FileFingerprints { path: path.to_string(), hashes: Vec::new() });
                self.files.len() - 1
            },
        };
        let file = &mut self.files[position];
        let position = match file.hashes.iter().position(|(existing, _)| existing == hash) {
            Some(position) => position,
            None => {
                file.hashes.push((hash.clone(), Candidates::default()));
                file.hashes.len() - 1
            },
        };
        file.hashes[position].1.push(release.edition(), release.version());
    }

    /// Files in probe order.
    pub fn files(&self) -> &[FileFingerprints] {
        &self.files
    }

    /// Candidates recorded for `path` having `hash`.
    pub fn lookup(&self, path: &str, hash: &ContentHash) -> Option<&Candidates> {
        self.files.iter().find(|file| file.path == path)?.get(hash)
    }

    /// Every recorded release, in database order.
    pub fn releases(&self) -> impl Iterator<Item = Release> + '_ {
        self.files.iter().flat_map(|file| file.hashes.iter()).flat_map(|(_, candidates)| candidates.releases())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Order files by descending number of recorded hashes, keeping the
    /// current order among equals.
    pub fn sort_by_hash_count(&mut self) {
        self.files.sort_by(|a, b| b.hashes.len().cmp(&a.hashes.len()));
    }

    /// Encode as JSON with four-space indentation.
    pub fn to_json(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer).or_raise(|| ErrorKind::Serialize)?;
        String::from_utf8(buffer).or_raise(|| ErrorKind::Serialize)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).or_raise(|| ErrorKind::Deserialize)
    }

    /// Write the database to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).or_raise(|| ErrorKind::Persist(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), files = self.files.len(), "Saved fingerprint database");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
        let database = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), files = database.files.len(), "Loaded fingerprint database");
        Ok(database)
    }
}
impl Serialize for FingerprintDatabase {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.files.iter().map(|file| (file.path(), file)))
    }
}
impl<'de> Deserialize<'de> for FingerprintDatabase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let OrderedMap(files) = OrderedMap::<String, OrderedMap<ContentHash, Candidates>>::deserialize(deserializer)?;
        let files = files
            .into_iter()
            .map(|(path, OrderedMap(hashes))| FileFingerprints { path, hashes })
            .collect();
        Ok(Self { files })
    }
}

/// A JSON object read as a list of entries, keeping document order.
struct OrderedMap<K, V>(Vec<(K, V)>);
impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: Deserialize<'de> + PartialEq + std::fmt::Display,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

struct OrderedMapVisitor<K, V>(PhantomData<(K, V)>);
impl<'de, K, V> Visitor<'de> for OrderedMapVisitor<K, V>
where
    K: Deserialize<'de> + PartialEq + std::fmt::Display,
    V: Deserialize<'de>,
{
    type Value = OrderedMap<K, V>;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut entries: Vec<(K, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<K, V>()? {
            if entries.iter().any(|(existing, _)| *existing == key) {
                return Err(de::Error::custom(format!("duplicate key: {key}")));
            }
            entries.push((key, value));
        }
        Ok(OrderedMap(entries))
    }
}
