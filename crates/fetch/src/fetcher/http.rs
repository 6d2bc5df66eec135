//! HTTP(S) fetcher backed by `reqwest`.

use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::instrument;

use crate::error::{Error, ErrorKind, Result};
use crate::fetcher::Fetcher;
use crate::url::BaseUrl;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("relprint/", env!("CARGO_PKG_VERSION"));
/// Per-fetch timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches assets over HTTP or HTTPS.
///
/// Redirects are followed. Only establishing a connection is bounded here;
/// wrap in a [`TimeoutFetcher`](crate::fetcher::TimeoutFetcher) to bound the
/// whole fetch.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}
impl HttpFetcher {
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .build()
            .or_raise(|| ErrorKind::Network("cannot initialise HTTP client".to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(level = "debug", skip(self, base), fields(fetcher = self.name()))]
    async fn fetch(&self, base: &BaseUrl, path: &str) -> Result<Vec<u8>> {
        let url = base.join(path)?;
        let response = self.client.get(&url).send().await.map_err(|err| transport_error(&url, err))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            exn::bail!(ErrorKind::NotFound(url));
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status { url, status: status.as_u16() });
        }
        let body = response.bytes().await.map_err(|err| transport_error(&url, err))?;
        tracing::trace!(%url, bytes = body.len(), "Fetched asset");
        Ok(body.to_vec())
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> Error {
    let kind = match err.is_timeout() {
        true => ErrorKind::Timeout(url.to_string()),
        false => ErrorKind::Network(url.to_string()),
    };
    exn::Exn::new(err).raise(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap()
    }

    fn base(server: &Server) -> BaseUrl {
        format!("{}/", server.url()).parse().unwrap()
    }

    #[tokio::test]
    async fn fetches_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/js/varien/form.js")
            .match_header("user-agent", DEFAULT_USER_AGENT)
            .with_status(200)
            .with_body("a")
            .create_async()
            .await;

        let body = fetcher().fetch(&base(&server), "js/varien/form.js").await.unwrap();
        assert_eq!(body, b"a");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", "/js/missing.js").with_status(404).create_async().await;

        let err = fetcher().fetch(&base(&server), "js/missing.js").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn error_status() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", "/js/broken.js").with_status(503).create_async().await;

        let err = fetcher().fetch(&base(&server), "js/broken.js").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Status { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn invalid_path_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

        let err = fetcher().fetch(&base(&server), "../app/etc/local.xml").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let base: BaseUrl = "http://127.0.0.1:1/".parse().unwrap();
        let err = fetcher().fetch(&base, "js/form.js").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Network(_) | ErrorKind::Timeout(_)));
    }
}
