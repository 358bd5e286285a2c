//! Data API v3 HTTP client.

use std::sync::Arc;
use std::time::Duration;

use curator_core::{Error, HttpError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::auth::CredentialProvider;
use crate::parser::parse_error;
use crate::snapshot::SnapshotWriter;

pub const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of attempts for read requests.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_RETRY_DELAY_MS: u64 = 500;

/// `YouTube` Data API client.
#[derive(Clone)]
pub struct YouTubeClient {
    /// HTTP client for making requests.
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    /// Where raw responses are dumped for debugging, if anywhere.
    snapshots: Option<SnapshotWriter>,
}

impl YouTubeClient {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .pool_max_idle_per_host(4)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
            credentials,
            snapshots: None,
        })
    }

    /// Send requests to another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Dump raw listing responses through `writer`.
    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    pub(crate) const fn snapshots(&self) -> Option<&SnapshotWriter> {
        self.snapshots.as_ref()
    }

    pub(crate) fn url(&self, resource: &str, query: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}/{resource}", self.base_url.trim_end_matches('/'));
        let mut url =
            Url::parse(&raw).map_err(|e| Error::Http(HttpError::InvalidUrl(format!("{raw}: {e}"))))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET a resource, retrying transient failures.
    pub(crate) async fn get<R>(&self, resource: &str, query: &[(&str, &str)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url(resource, query)?;

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                debug!("Retry attempt {attempt} for {resource} after {delay:?}");
            }

            match self.do_request(&Method::GET, &url, None).await {
                Ok(bytes) => {
                    return serde_json::from_slice(&bytes).map_err(|e| {
                        Error::ParseError(format!("Failed to parse {resource} response: {e}"))
                    });
                }
                Err(e) => {
                    warn!("Request to {resource} failed (attempt {attempt}): {e}");

                    if !e.is_transient() {
                        return Err(e);
                    }

                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Network("Request failed".to_string())))
    }

    /// PUT a JSON body. Never retried here.
    pub(crate) async fn put<B>(&self, resource: &str, query: &[(&str, &str)], body: &B) -> Result<()>
    where
        B: Serialize,
    {
        let url = self.url(resource, query)?;
        let body = serde_json::to_vec(body)?;
        self.do_request(&Method::PUT, &url, Some(&body)).await?;
        Ok(())
    }

    /// DELETE a resource. Never retried here.
    pub(crate) async fn delete_resource(&self, resource: &str, query: &[(&str, &str)]) -> Result<()> {
        let url = self.url(resource, query)?;
        self.do_request(&Method::DELETE, &url, None).await?;
        Ok(())
    }

    /// One request, with a single credential refresh on 401.
    async fn do_request(&self, method: &Method, url: &Url, body: Option<&[u8]>) -> Result<Vec<u8>> {
        let token = self.credentials.access_token().await?;
        let mut response = self.send(method, url, body, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Access token rejected, refreshing");
            let token = self.credentials.refresh().await?;
            response = self.send(method, url, body, &token).await?;
        }

        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            let message = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &message, retry_after));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::Network(format!("Failed to read response body: {e}")))
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
        token: &str,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, format!("Bearer {token}"));
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Http(HttpError::Timeout)
            } else if e.is_connect() {
                Error::Http(HttpError::ConnectionFailed(e.to_string()))
            } else {
                Error::Network(e.to_string())
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    fn client() -> YouTubeClient {
        YouTubeClient::new(Arc::new(StaticToken::new("token"))).unwrap()
    }

    #[test]
    fn test_url_building() {
        let url = client()
            .url("playlistItems", &[("part", "snippet,status"), ("playlistId", "PL 1")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/playlistItems?part=snippet%2Cstatus&playlistId=PL+1"
        );
    }

    #[test]
    fn test_custom_base_url() {
        let url = client()
            .with_base_url("http://localhost:8080/v3/")
            .url("videos", &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v3/videos");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = client().with_base_url("not a url").url("videos", &[]).unwrap_err();
        assert!(matches!(err, Error::Http(HttpError::InvalidUrl(_))));
    }
}
