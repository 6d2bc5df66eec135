//! Greedy fingerprint construction.
//!
//! The builder cycles through the ranked files. On each pass it looks at one
//! file and assigns every still-pending release whose hash group for that file
//! is no larger than the current tolerance. Tolerance starts at one (only
//! hashes unique to a single release qualify) and grows by one for every
//! `accuracy_step` passes, so releases that cannot be singled out eventually
//! settle for the smallest ambiguous group the ranking reaches first.

use relprint_manifest::{ContentHash, ManifestSet, Release};
use std::num::NonZeroU32;
use tracing::instrument;

use crate::database::FingerprintDatabase;
use crate::error::{ErrorKind, Result};
use crate::partition::Ranking;

/// Passes between each increase in tolerance.
pub const DEFAULT_ACCURACY_STEP: u32 = 500;

/// One release being attached to a `(path, hash)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub release: Release,
    pub path: String,
    pub hash: ContentHash,
    /// Number of releases sharing `hash` for `path`.
    pub group_size: usize,
    /// Tolerance in effect when the assignment was made.
    pub tolerance: usize,
    /// Zero-based pass number.
    pub pass: u64,
}

/// Statistics from one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of passes over ranked files, skipped passes included.
    pub passes: u64,
    /// Tolerance in effect on the last pass.
    pub final_tolerance: usize,
    /// Assignments in the order they were made.
    pub assignments: Vec<Assignment>,
    /// Releases whose manifest was empty after filtering.
    pub unresolvable: Vec<Release>,
}
impl BuildReport {
    /// Assignments that single out exactly one release.
    pub fn exact(&self) -> usize {
        self.assignments.iter().filter(|a| a.group_size == 1).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Builder {
    accuracy_step: NonZeroU32,
}
impl Builder {
    pub fn new(accuracy_step: NonZeroU32) -> Self {
        Self { accuracy_step }
    }

    pub fn accuracy_step(&self) -> NonZeroU32 {
        self.accuracy_step
    }

    /// Largest group size accepted after `attempts` passes.
    ///
    /// `max(1, ceil(attempts / accuracy_step))`: never decreasing, one for the
    /// first `accuracy_step + 1` passes.
    pub fn tolerance(&self, attempts: u64) -> usize {
        let raised = attempts.div_ceil(u64::from(self.accuracy_step.get()));
        usize::try_from(raised).unwrap_or(usize::MAX).max(1)
    }

    /// Build a database from `manifests`.
    ///
    /// Releases with empty manifests are reported as unresolvable instead of
    /// being assigned. Fails if no release is left to assign.
    #[instrument(skip_all, fields(releases = manifests.len(), accuracy_step = self.accuracy_step.get()))]
    pub fn build(&self, manifests: &ManifestSet) -> Result<(FingerprintDatabase, BuildReport)> {
        let mut report = BuildReport::default();
        let mut pending: Vec<&Release> = Vec::new();
        for (release, manifest) in manifests.iter() {
            if manifest.is_empty() {
                tracing::warn!(%release, "Release has no usable files and cannot be fingerprinted");
                report.unresolvable.push(release.clone());
            } else {
                pending.push(release);
            }
        }
        if pending.is_empty() {
            exn::bail!(ErrorKind::NoReleases);
        }

        let ranking = Ranking::new(manifests);
        let mut remaining: Vec<usize> = ranking.files().iter().map(|file| file.release_count()).collect();
        let mut database = FingerprintDatabase::new();
        let mut cursor = 0;

        while !pending.is_empty() {
            let tolerance = self.tolerance(report.passes);
            report.final_tolerance = tolerance;
            let file = &ranking.files()[cursor];

            if remaining[cursor] > 0 {
                let mut resolved: Vec<(&Release, &ContentHash, usize)> = Vec::new();
                pending.retain(|&release| {
                    let Some(hash) = manifests.get(release).and_then(|m| m.hash_for(file.path())) else {
                        return true;
                    };
                    let group_size = file.group_size(hash);
                    if group_size > tolerance {
                        return true;
                    }
                    resolved.push((release, hash, group_size));
                    false
                });

                for (release, hash, group_size) in resolved {
                    tracing::info!(
                        %release,
                        file = file.path(),
                        %hash,
                        group_size,
                        tolerance,
                        "Assigned fingerprint"
                    );
                    database.assign(file.path(), hash, release);
                    for (path, _) in manifests.get(release).into_iter().flat_map(|m| m.files()) {
                        if let Some(position) = ranking.position(path) {
                            remaining[position] -= 1;
                        }
                    }
                    report.assignments.push(Assignment {
                        release: release.clone(),
                        path: file.path().to_string(),
                        hash: hash.clone(),
                        group_size,
                        tolerance,
                        pass: report.passes,
                    });
                }
                tracing::debug!(
                    pass = report.passes,
                    file = file.path(),
                    tolerance,
                    pending = pending.len(),
                    "Finished pass"
                );
            }

            report.passes += 1;
            cursor = (cursor + 1) % ranking.len();
        }

        database.sort_by_hash_count();
        tracing::info!(
            passes = report.passes,
            files = database.len(),
            exact = report.exact(),
            assigned = report.assignments.len(),
            unresolvable = report.unresolvable.len(),
            "Fingerprint database built"
        );
        Ok((database, report))
    }
}
impl Default for Builder {
    fn default() -> Self {
        Self::new(NonZeroU32::new(DEFAULT_ACCURACY_STEP).unwrap_or(NonZeroU32::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relprint_manifest::Manifest;
    use rstest::rstest;
    use std::collections::HashSet;

    fn step(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn manifest(files: &[(&str, &str)]) -> Manifest {
        files.iter().map(|(path, content)| (ContentHash::compute(content), path.to_string())).collect()
    }

    fn set(releases: &[(&str, Manifest)]) -> ManifestSet {
        releases.iter().map(|(release, manifest)| (release.parse().unwrap(), manifest.clone())).collect()
    }

    fn release(s: &str) -> Release {
        s.parse().unwrap()
    }

    #[rstest]
    #[case(1, 0, 1)]
    #[case(1, 1, 1)]
    #[case(1, 2, 2)]
    #[case(1, 7, 7)]
    #[case(500, 0, 1)]
    #[case(500, 500, 1)]
    #[case(500, 501, 2)]
    #[case(500, 1000, 2)]
    #[case(500, 1001, 3)]
    fn tolerance_schedule(#[case] accuracy_step: u32, #[case] attempts: u64, #[case] expected: usize) {
        assert_eq!(Builder::new(step(accuracy_step)).tolerance(attempts), expected);
    }

    #[test]
    fn tolerance_never_decreases() {
        let builder = Builder::new(step(3));
        for attempts in 0..100 {
            assert!(builder.tolerance(attempts + 1) >= builder.tolerance(attempts));
        }
    }

    #[test]
    fn unique_hashes_resolve_on_first_file() {
        let manifests = set(&[
            ("CE-1.0", manifest(&[("a.js", "h1"), ("b.js", "x")])),
            ("CE-1.1", manifest(&[("a.js", "h2"), ("b.js", "x")])),
        ]);
        let (database, report) = Builder::default().build(&manifests).unwrap();

        assert_eq!(report.passes, 1);
        assert_eq!(report.final_tolerance, 1);
        assert_eq!(database.len(), 1);
        let file = &database.files()[0];
        assert_eq!(file.path(), "a.js");
        assert!(file.get(&ContentHash::compute("h1")).unwrap().contains(&release("CE-1.0")));
        assert!(file.get(&ContentHash::compute("h2")).unwrap().contains(&release("CE-1.1")));
        assert!(database.lookup("b.js", &ContentHash::compute("x")).is_none());
    }

    #[test]
    fn indistinguishable_releases_share_an_entry() {
        let manifests = set(&[
            ("CE-1.0", manifest(&[("a.js", "h")])),
            ("CE-1.1", manifest(&[("a.js", "h")])),
        ]);
        let (database, report) = Builder::new(step(1)).build(&manifests).unwrap();

        // Passes 0 and 1 run at tolerance 1, pass 2 at tolerance 2.
        assert_eq!(report.passes, 3);
        assert_eq!(report.final_tolerance, 2);
        let candidates = database.lookup("a.js", &ContentHash::compute("h")).unwrap();
        assert_eq!(candidates.versions(relprint_manifest::Edition::Community).unwrap(), ["1.0", "1.1"]);
        assert!(report.assignments.iter().all(|a| a.group_size == 2 && a.tolerance == 2));
    }

    #[test]
    fn distinct_release_resolves_before_colliding_pair() {
        let manifests = set(&[
            ("CE-1.0", manifest(&[("a.js", "h1")])),
            ("CE-1.1", manifest(&[("a.js", "h2")])),
            ("CE-1.2", manifest(&[("a.js", "h2")])),
        ]);
        let (database, report) = Builder::new(step(1)).build(&manifests).unwrap();

        assert_eq!(report.passes, 3);
        assert_eq!(report.final_tolerance, 2);
        let placed: Vec<(String, u64, usize, usize)> = report
            .assignments
            .iter()
            .map(|a| (a.release.to_string(), a.pass, a.tolerance, a.group_size))
            .collect();
        assert_eq!(
            placed,
            [
                ("CE-1.0".to_string(), 0, 1, 1),
                ("CE-1.1".to_string(), 2, 2, 2),
                ("CE-1.2".to_string(), 2, 2, 2),
            ]
        );

        let distinct = database.lookup("a.js", &ContentHash::compute("h1")).unwrap();
        assert_eq!(distinct.versions(relprint_manifest::Edition::Community).unwrap(), ["1.0"]);
        let pair = database.lookup("a.js", &ContentHash::compute("h2")).unwrap();
        assert_eq!(pair.iter().count(), 1);
        assert_eq!(pair.versions(relprint_manifest::Edition::Community).unwrap(), ["1.1", "1.2"]);
    }

    #[test]
    fn empty_manifests_are_unresolvable() {
        let manifests = set(&[("CE-1.0", manifest(&[("a.js", "h")])), ("EE-1.0", Manifest::default())]);
        let (database, report) = Builder::default().build(&manifests).unwrap();
        assert_eq!(report.unresolvable, [release("EE-1.0")]);
        assert_eq!(database.releases().collect::<Vec<_>>(), [release("CE-1.0")]);
    }

    #[rstest]
    #[case(ManifestSet::new())]
    #[case(set(&[("CE-1.0", Manifest::default())]))]
    fn nothing_to_build(#[case] manifests: ManifestSet) {
        let err = Builder::default().build(&manifests).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NoReleases));
    }

    #[test]
    fn most_discriminating_file_used_first() {
        let manifests = set(&[
            ("CE-1.0", manifest(&[("common.js", "c1"), ("rare.js", "r1")])),
            ("CE-1.1", manifest(&[("common.js", "c2"), ("rare.js", "r1")])),
            ("CE-1.2", manifest(&[("common.js", "c3"), ("rare.js", "r2")])),
        ]);
        let (database, _) = Builder::default().build(&manifests).unwrap();
        let paths: Vec<&str> = database.files().iter().map(|f| f.path()).collect();
        assert_eq!(paths, ["common.js"]);
        assert_eq!(database.files()[0].len(), 3);
    }

    /// A larger synthetic history: many releases, some files changing every
    /// release, some every few releases, and a couple of identical releases.
    fn history() -> ManifestSet {
        let mut releases = Vec::new();
        for minor in 0..12u32 {
            let mut files = vec![
                ("js/slow.js".to_string(), format!("slow-{}", minor / 4)),
                ("js/medium.js".to_string(), format!("medium-{}", minor / 2)),
                ("skin/style.css".to_string(), format!("style-{}", minor % 3)),
            ];
            if minor % 5 != 0 {
                files.push(("js/rare.js".to_string(), format!("rare-{minor}")));
            }
            let manifest: Manifest =
                files.iter().map(|(path, content)| (ContentHash::compute(content), path.clone())).collect();
            releases.push((Release::new(relprint_manifest::Edition::Community, format!("1.{minor}")), manifest));
        }
        let twin: Manifest = [(ContentHash::compute("twin"), "js/twin.js".to_string())].into_iter().collect();
        releases.push((release("EE-1.0"), twin.clone()));
        releases.push((release("EE-1.1"), twin));
        releases.into_iter().collect()
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(10)]
    fn every_release_assigned_exactly_once(#[case] accuracy_step: u32) {
        let manifests = history();
        let (database, report) = Builder::new(step(accuracy_step)).build(&manifests).unwrap();

        let recorded: Vec<Release> = database.releases().collect();
        let unique: HashSet<&Release> = recorded.iter().collect();
        assert_eq!(recorded.len(), unique.len(), "a release was recorded twice");
        assert_eq!(unique.len(), manifests.len());
        assert!(report.unresolvable.is_empty());
        assert!(database.files().windows(2).all(|pair| pair[0].len() >= pair[1].len()));

        for assignment in &report.assignments {
            let manifest = manifests.get(&assignment.release).unwrap();
            assert_eq!(manifest.hash_for(&assignment.path), Some(&assignment.hash));
            assert!(assignment.group_size <= assignment.tolerance);
        }
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(25)]
    fn terminates_within_bound(#[case] accuracy_step: u32) {
        let manifests = history();
        let files = Ranking::new(&manifests).len() as u64;
        let (_, report) = Builder::new(step(accuracy_step)).build(&manifests).unwrap();
        let bound = u64::from(accuracy_step) * manifests.len() as u64 + files;
        assert!(report.passes <= bound, "{} passes exceeds {bound}", report.passes);
    }

    #[test]
    fn tolerance_monotonic_across_assignments() {
        let (_, report) = Builder::new(step(2)).build(&history()).unwrap();
        for pair in report.assignments.windows(2) {
            assert!(pair[0].pass <= pair[1].pass);
            assert!(pair[0].tolerance <= pair[1].tolerance);
        }
    }

    #[test]
    fn deterministic() {
        let builder = Builder::new(step(2));
        let (first, _) = builder.build(&history()).unwrap();
        let (second, _) = builder.build(&history()).unwrap();
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
