//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the harvest logic and the network.
//! [`ReqwestFetcher`] is the production implementation; tests drive the
//! engine with scripted fetchers instead.

use crate::error::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use scraper::Html;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Retrieve a URL and hand back the parsed document.
pub trait PageFetcher {
    /// Fetch `url`, failing with [`FetchError`] on network errors, timeouts
    /// and non-success HTTP statuses.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Html, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        } else {
            warn!(user_agent, "Ignoring user agent that is not a valid header value");
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for ReqwestFetcher {
    #[instrument(level = "debug", skip(self), fields(%url))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Html, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(Html::parse_document(&body))
    }
}
