//! Manifest loading.
//!
//! A listing is a plain text file with one `<hash> <relative-path>` line per
//! asset. Listings live side by side in one directory, named after the release
//! they describe behind a common prefix (e.g. `magento-CE-1.7.0.2`).

use exn::ResultExt;
use std::fs;
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::filter::PathFilter;
use crate::hash::ContentHash;
use crate::manifest::{Manifest, ManifestSet};
use crate::release::Release;

/// Parse the contents of one listing.
///
/// Lines are split on their first whitespace into hash and path. Blank lines,
/// lines without a path, lines with a malformed hash and paths rejected by
/// the filter are skipped.
pub fn parse_listing(listing: &str, filter: &PathFilter) -> Manifest {
    listing.lines().filter_map(|line| parse_line(line, filter)).collect()
}

fn parse_line(line: &str, filter: &PathFilter) -> Option<(ContentHash, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some((hash, path)) = line.split_once(char::is_whitespace) else {
        tracing::debug!(line, "Skipping listing line without a path");
        return None;
    };
    let path = path.trim_start();
    let Ok(hash) = hash.parse::<ContentHash>() else {
        tracing::debug!(line, "Skipping listing line with a malformed hash");
        return None;
    };
    if !filter.is_reliable(path) {
        tracing::trace!(path, "Skipping unreliable path");
        return None;
    }
    Some((hash, path.to_string()))
}

/// Reads every release listing found in a directory.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    prefix: String,
    filter: PathFilter,
}
impl Loader {
    pub fn new(prefix: impl Into<String>, filter: PathFilter) -> Self {
        Self { prefix: prefix.into(), filter }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Load all listings in `directory`.
    ///
    /// Only an unreadable directory is fatal. Entries whose name lacks the
    /// prefix are ignored; listings that cannot be read or whose name is not a
    /// release identifier are skipped with a warning and contribute nothing.
    #[instrument(skip(self, directory), fields(directory = %directory.display()))]
    pub fn load_dir(&self, directory: &Path) -> Result<ManifestSet> {
        let entries =
            fs::read_dir(directory).or_raise(|| ErrorKind::DirectoryUnreadable(directory.to_path_buf()))?;
        let mut set = ManifestSet::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                },
            };
            let Some(key) = self.release_key(&path) else {
                continue;
            };
            let release = match key.parse::<Release>() {
                Ok(release) => release,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping listing with unrecognised release name");
                    continue;
                },
            };
            match self.load_file(&path) {
                Ok(manifest) => {
                    tracing::debug!(release = %release, files = manifest.len(), "Loaded listing");
                    set.insert(release, manifest);
                },
                Err(e) => tracing::warn!(release = %release, error = %e, "Skipping unreadable listing"),
            }
        }
        Ok(set)
    }

    /// Load a single listing file.
    pub fn load_file(&self, path: &Path) -> Result<Manifest> {
        let listing = fs::read_to_string(path).or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?;
        Ok(parse_listing(&listing, &self.filter))
    }

    fn release_key<'a>(&self, path: &'a Path) -> Option<&'a str> {
        path.file_name()?.to_str()?.strip_prefix(self.prefix.as_str()).filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::Edition;

    const A: &str = "0cc175b9c0f1b6a831c399e269772661";
    const B: &str = "92eb5ffee6ae2fec3ad71c777531578f";
    const C: &str = "4a8a08f09d37b73795649038408b5f33";

    #[test]
    fn parse_listing_applies_filter_and_skips_malformed_lines() {
        let listing = format!(
            "{A} js/varien/form.js\n\
             \n\
             {B}\n\
             nothex js/broken.js\n\
             {C} skin/frontend/rwd/default/css/styles.css\n\
             {B} media/logo.png\n\
             {C} skin/frontend/default/default/css/styles.css\n"
        );
        let manifest = parse_listing(&listing, &PathFilter::default());
        let files: Vec<(&str, &str)> = manifest.files().map(|(p, h)| (p, h.as_str())).collect();
        assert_eq!(files, [("js/varien/form.js", A), ("skin/frontend/default/default/css/styles.css", C)]);
    }

    #[test]
    fn parse_listing_path_keeps_inner_spaces() {
        let manifest = parse_listing(&format!("{A}  js/some dir/file.js\r\n"), &PathFilter::default());
        assert_eq!(manifest.hash_for("js/some dir/file.js").map(ContentHash::as_str), Some(A));
    }

    #[test]
    fn load_dir_skips_unusable_listings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("magento-CE-1.0"), format!("{A} js/a.js\n")).unwrap();
        fs::write(dir.path().join("magento-EE-1.0"), format!("{B} js/a.js\n")).unwrap();
        fs::write(dir.path().join("magento-XX-1.0"), format!("{C} js/a.js\n")).unwrap();
        fs::write(dir.path().join("README"), "not a listing").unwrap();
        fs::create_dir(dir.path().join("magento-CE-2.0")).unwrap();

        let loader = Loader::new("magento-", PathFilter::default());
        let set = loader.load_dir(dir.path()).unwrap();
        let releases: Vec<String> = set.releases().map(Release::to_string).collect();
        assert_eq!(releases, ["CE-1.0", "EE-1.0"]);
        let enterprise = Release::new(Edition::Enterprise, "1.0");
        assert_eq!(set.get(&enterprise).unwrap().hash_for("js/a.js").map(ContentHash::as_str), Some(B));
    }

    #[test]
    fn load_dir_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = Loader::default().load_dir(&missing).unwrap_err();
        assert!(matches!(&*err, ErrorKind::DirectoryUnreadable(_)));
    }

    #[test]
    fn load_file_reports_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = Loader::default().load_file(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unreadable(_)));
    }
}
