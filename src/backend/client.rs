//! REST client for the SecMon backend

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::types::{AggregateStats, Event, EventAnalysis, ProcessTree};

const USER_AGENT_VALUE: &str = concat!("secmon-feed/", env!("CARGO_PKG_VERSION"));

/// Typed client for the backend's read endpoints
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: Url, timeout: Duration) -> FeedResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn from_config(config: &FeedConfig) -> FeedResult<Self> {
        Self::new(config.api_url.clone(), config.http_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/events?limit=N`, in the order the backend returns them
    pub async fn fetch_events(&self, limit: usize) -> FeedResult<Vec<Event>> {
        let mut url = self.endpoint("api/events")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    /// `GET /api/stats`
    pub async fn fetch_stats(&self) -> FeedResult<AggregateStats> {
        let url = self.endpoint("api/stats")?;
        self.get_json(url).await
    }

    /// `GET /api/processes/tree`
    pub async fn fetch_process_tree(&self) -> FeedResult<ProcessTree> {
        let url = self.endpoint("api/processes/tree")?;
        self.get_json(url).await
    }

    /// `GET /api/analysis/{id}`; a 404 maps to [`FeedError::NotFound`]
    pub async fn fetch_analysis(&self, event_id: u64) -> FeedResult<EventAnalysis> {
        let url = self.endpoint(&format!("api/analysis/{}", event_id))?;
        match self.get_json(url).await {
            Err(FeedError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(FeedError::NotFound(format!("event {}", event_id)))
            }
            other => other,
        }
    }

    /// Resolve `path` (relative, no leading slash) under the base URL, keeping any prefix
    fn endpoint(&self, path: &str) -> FeedResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FeedResult<T> {
        debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status,
                url: url.to_string(),
            });
        }

        // Decode from text so that a non-JSON body surfaces as a decode error
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Make `url` a directory so relative joins append to its path instead of replacing the
/// last segment
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    url
}
