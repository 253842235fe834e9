use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use url::Url;

use crate::config::FetchConfig;
use crate::errors::FetchError;
use crate::net::{HttpClient, ReqwestClient};

lazy_static! {
    static ref DEFAULT_FETCHER: StepFetcher = StepFetcher::from_config(&FetchConfig::default());
}

/// Fetches STEP file content from an HTTP(S) URL with the default client.
///
/// For local files, read the content yourself and pass it on directly.
pub async fn fetch_remote_text(url: &str) -> Result<String, FetchError> {
    DEFAULT_FETCHER.fetch_text(url).await
}

/// Retrieves remote STEP text through an injected [`HttpClient`].
///
/// A fetcher without a client is valid; every HTTP(S) fetch through it fails
/// with [`FetchError::CapabilityUnavailable`].
#[derive(Clone)]
pub struct StepFetcher {
    client: Option<Arc<dyn HttpClient>>,
}

impl StepFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client: Some(client) }
    }

    pub fn without_client() -> Self {
        Self { client: None }
    }

    /// Builds a fetcher on top of [`ReqwestClient`]. If the client cannot be
    /// created the fetcher has no capability and a warning is logged.
    pub fn from_config(config: &FetchConfig) -> Self {
        match ReqwestClient::new(config) {
            Ok(client) => Self::new(Arc::new(client)),
            Err(e) => {
                log::warn!("HTTP client unavailable, remote STEP fetching disabled: {}", e);
                Self::without_client()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// Performs exactly one request. Checks run in order: scheme, client
    /// availability, request, status, body.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        if !is_http_url(url) {
            return Err(FetchError::UnsupportedScheme(url.to_string()));
        }
        let client = self.client.as_ref().ok_or(FetchError::CapabilityUnavailable)?;

        log::debug!("Fetching STEP file from {}", url);

        let parsed = Url::parse(url).map_err(|e| {
            log::warn!("Cannot parse URL {}: {}", url, e);
            FetchError::network(&e)
        })?;

        let response = match client.get(&parsed).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Network error fetching {}: {}", url, e);
                return Err(FetchError::network(&e));
            }
        };

        if !response.is_success() {
            log::warn!("{} answered HTTP {} {}", url, response.status, response.status_text);
            return Err(FetchError::HttpStatus {
                status: response.status,
                status_text: response.status_text,
            });
        }

        let text = response.text().await.map_err(FetchError::Body)?;
        log::debug!("Fetched {} bytes of STEP text from {}", text.len(), url);

        Ok(text)
    }
}

impl fmt::Debug for StepFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepFetcher")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Case-insensitive `^https?://` check.
fn is_http_url(url: &str) -> bool {
    let starts_with = |prefix: &str| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    starts_with("http://") || starts_with("https://")
}
