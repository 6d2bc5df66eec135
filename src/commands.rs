use exn::ResultExt;
use relprint_config::Config;
use relprint_fetch::BaseUrl;
use relprint_fetch::fetcher::{HttpFetcher, TimeoutFetcher};
use relprint_fingerprint::FingerprintDatabase;
use relprint_resolve::{Identification, Resolver};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Write a listing for every unpacked release.
///
/// A release that fails is logged and counted; the others are still written.
#[instrument(skip_all, fields(releases = %config.releases.directory.display()))]
pub fn generate(config: &Config) -> Result<()> {
    let source = &config.releases.directory;
    let producer = config.releases.producer(&config.manifests);
    let releases = producer.discover(source).or_raise(|| ErrorKind::Releases(source.clone()))?;

    let mut failed = 0;
    for tree in &releases {
        let release = &tree.release;
        match producer.generate(tree, &config.manifests.directory) {
            Ok(listing) => tracing::info!(%release, listing = %listing.display(), "Generated listing"),
            Err(err) => {
                tracing::warn!(%release, error = ?err, "Failed to generate listing");
                failed += 1;
            },
        }
    }
    tracing::info!(generated = releases.len() - failed, failed, "Finished generating listings");
    if failed > 0 {
        exn::bail!(ErrorKind::Generate(failed));
    }
    Ok(())
}

/// Build the fingerprint database from listings and persist it.
#[instrument(skip_all, fields(manifests = %config.manifests.directory.display()))]
pub fn build(config: &Config) -> Result<()> {
    let directory = &config.manifests.directory;
    let target = &config.fingerprint.database;
    let manifests =
        config.manifests.loader().load_dir(directory).or_raise(|| ErrorKind::Manifests(directory.clone()))?;
    let (database, report) =
        config.fingerprint.builder().build(&manifests).or_raise(|| ErrorKind::NoReleases(directory.clone()))?;
    for release in &report.unresolvable {
        tracing::warn!(%release, "Release is not in the database");
    }
    database.save(target).or_raise(|| ErrorKind::Persist(target.clone()))?;
    tracing::info!(
        database = %target.display(),
        files = database.len(),
        releases = report.assignments.len(),
        exact = report.exact(),
        passes = report.passes,
        "Wrote fingerprint database"
    );
    Ok(())
}

/// Identify the release deployed at `url`.
pub async fn check(config: &Config, url: &str) -> Result<Identification> {
    let base = url.parse::<BaseUrl>().or_raise(|| ErrorKind::InvalidUrl(url.to_string()))?;
    let path = &config.fingerprint.database;
    let database = FingerprintDatabase::load(path).or_raise(|| ErrorKind::Database(path.clone()))?;
    let timeout = config.resolver.timeout();
    let http = HttpFetcher::new(&config.resolver.user_agent, timeout).or_raise(|| ErrorKind::Fetcher)?;
    let fetcher = TimeoutFetcher::new(Arc::new(http), timeout);
    let resolver = Resolver::new(database, Arc::new(fetcher)).with_concurrency(config.resolver.concurrency());
    Ok(resolver.identify_url(&base).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::fs;
    use std::path::Path;

    fn release_tree(root: &Path, form: &str, styles: &str) {
        fs::create_dir_all(root.join("js/varien")).unwrap();
        fs::create_dir_all(root.join("skin/frontend/default")).unwrap();
        fs::write(root.join("js/varien/form.js"), form).unwrap();
        fs::write(root.join("skin/frontend/default/styles.css"), styles).unwrap();
    }

    fn config(root: &Path) -> Config {
        let mut config = Config::default();
        config.releases.directory = root.join("release");
        config.manifests.directory = root.join("md5");
        config.fingerprint.database = root.join("version.json");
        config
    }

    #[tokio::test]
    async fn generate_build_and_check() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        release_tree(&config.releases.directory.join("CE-1.0"), "form-1", "styles");
        release_tree(&config.releases.directory.join("CE-1.1"), "form-2", "styles");
        release_tree(&config.releases.directory.join("EE-1.0"), "form-1", "styles-ee");

        generate(&config).unwrap();
        assert!(config.manifests.directory.join("magento-CE-1.0").is_file());
        build(&config).unwrap();
        let database = FingerprintDatabase::load(&config.fingerprint.database).unwrap();
        assert_eq!(database.releases().count(), 3);

        // styles.css is probed first but not served, so form.js decides.
        let mut server = Server::new_async().await;
        let _form = server.mock("GET", "/js/varien/form.js").with_body("form-2").create_async().await;
        let found = check(&config, &format!("{}/", server.url())).await.unwrap();
        assert!(found.candidates().unwrap().contains(&"CE-1.1".parse().unwrap()));
    }

    #[tokio::test]
    async fn check_unknown_site() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        let mut database = FingerprintDatabase::new();
        database.assign(
            "js/varien/form.js",
            &relprint_manifest::ContentHash::compute("form-1"),
            &"CE-1.0".parse().unwrap(),
        );
        database.save(&config.fingerprint.database).unwrap();

        let mut server = Server::new_async().await;
        let _form = server.mock("GET", "/js/varien/form.js").with_status(404).create_async().await;
        let found = check(&config, &format!("{}/", server.url())).await.unwrap();
        assert_eq!(found, Identification::Unidentified);
    }

    #[tokio::test]
    async fn check_rejects_url_without_trailing_slash() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        FingerprintDatabase::new().save(&config.fingerprint.database).unwrap();
        let err = check(&config, "https://example.com").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn check_rejects_url_before_loading_database() {
        let root = tempfile::tempdir().unwrap();
        let err = check(&config(root.path()), "example.com/").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidUrl(_)));
    }

    #[test]
    fn generate_from_prefixed_release_directories() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        release_tree(&config.releases.directory.join("magento-CE-1.0"), "form-1", "styles");
        release_tree(&config.releases.directory.join("magento-EE-1.0"), "form-1", "styles-ee");
        generate(&config).unwrap();
        assert!(config.manifests.directory.join("magento-CE-1.0").is_file());
        assert!(config.manifests.directory.join("magento-EE-1.0").is_file());
    }

    #[test]
    fn build_without_listings() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        fs::create_dir_all(&config.manifests.directory).unwrap();
        let err = build(&config).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NoReleases(_)));
        assert!(!config.fingerprint.database.exists());
    }

    #[test]
    fn build_cannot_persist() {
        let root = tempfile::tempdir().unwrap();
        let mut config = config(root.path());
        release_tree(&config.releases.directory.join("CE-1.0"), "form-1", "styles");
        generate(&config).unwrap();
        config.fingerprint.database = root.path().join("missing/dir/version.json");
        let err = build(&config).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Persist(_)));
    }

    #[test]
    fn generate_without_release_directory() {
        let root = tempfile::tempdir().unwrap();
        let err = generate(&config(root.path())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Releases(_)));
    }
}
