use std::collections::{BTreeMap, HashMap};

use crate::hash::ContentHash;
use crate::release::Release;

/// The files of one release and the hash each one exhibits.
///
/// Built from `(hash, path)` pairs as emitted by a listing. At most one path
/// is stored per hash: when a listing repeats a hash, the last path wins but
/// keeps the position of the first occurrence. Each path then maps to exactly
/// one hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    files: Vec<(String, ContentHash)>,
    index: HashMap<String, usize>,
}
impl Manifest {
    /// The hash this release exhibits for `path`, if it ships the file.
    pub fn hash_for(&self, path: &str) -> Option<&ContentHash> {
        self.index.get(path).map(|&position| &self.files[position].1)
    }

    /// Files in listing order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &ContentHash)> {
        self.files.iter().map(|(path, hash)| (path.as_str(), hash))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
impl FromIterator<(ContentHash, String)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (ContentHash, String)>>(iter: I) -> Self {
        let mut by_hash: Vec<(ContentHash, String)> = Vec::new();
        let mut seen: HashMap<ContentHash, usize> = HashMap::new();
        for (hash, path) in iter {
            match seen.get(&hash) {
                Some(&position) => by_hash[position].1 = path,
                None => {
                    seen.insert(hash.clone(), by_hash.len());
                    by_hash.push((hash, path));
                },
            }
        }
        let mut manifest = Self::default();
        for (hash, path) in by_hash {
            match manifest.index.get(&path) {
                Some(&position) => manifest.files[position].1 = hash,
                None => {
                    manifest.index.insert(path.clone(), manifest.files.len());
                    manifest.files.push((path, hash));
                },
            }
        }
        manifest
    }
}

/// Manifests for every known release, iterated in release order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestSet {
    releases: BTreeMap<Release, Manifest>,
}
impl ManifestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous manifest if the release was already present.
    pub fn insert(&mut self, release: Release, manifest: Manifest) -> Option<Manifest> {
        self.releases.insert(release, manifest)
    }

    pub fn get(&self, release: &Release) -> Option<&Manifest> {
        self.releases.get(release)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Release, &Manifest)> {
        self.releases.iter()
    }

    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.keys()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
impl FromIterator<(Release, Manifest)> for ManifestSet {
    fn from_iter<I: IntoIterator<Item = (Release, Manifest)>>(iter: I) -> Self {
        Self { releases: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> ContentHash {
        ContentHash::compute([byte])
    }

    #[test]
    fn duplicate_hash_last_write_wins() {
        let manifest: Manifest = [
            (hash(1), "js/a.js".to_string()),
            (hash(2), "js/b.js".to_string()),
            (hash(1), "js/c.js".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.hash_for("js/a.js"), None);
        assert_eq!(manifest.hash_for("js/c.js"), Some(&hash(1)));
        let paths: Vec<&str> = manifest.files().map(|(path, _)| path).collect();
        assert_eq!(paths, ["js/c.js", "js/b.js"]);
    }

    #[test]
    fn path_maps_to_single_hash() {
        let manifest: Manifest = [
            (hash(1), "js/a.js".to_string()),
            (hash(2), "js/a.js".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.hash_for("js/a.js"), Some(&hash(2)));
    }

    #[test]
    fn set_iterates_in_release_order() {
        let set: ManifestSet = ["EE-1.0", "CE-1.1", "CE-1.0"]
            .iter()
            .map(|r| (r.parse().unwrap(), Manifest::default()))
            .collect();
        let order: Vec<String> = set.releases().map(Release::to_string).collect();
        assert_eq!(order, ["CE-1.0", "CE-1.1", "EE-1.0"]);
    }
}
