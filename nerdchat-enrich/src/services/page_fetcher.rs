//! Outbound page fetch
//!
//! The resolver talks to the network only through [`PageFetcher`], so tests
//! can count and script requests without a live server.

use crate::error::FetchError;
use async_trait::async_trait;
use nerdchat_common::config::DEFAULT_TIMEOUT_SECS;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::debug;

/// Default timeout for artist page requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Identifying User-Agent sent with every request
pub const USER_AGENT: &str = concat!(
    "nerdchat/",
    env!("CARGO_PKG_VERSION"),
    " (compatible; MusicNerdBot/1.0)"
);

/// Raw HTTP response: status plus body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Single HTTP GET
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed fetcher with a hard timeout
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    http_client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(user_agent)
                .map_err(|e| FetchError::Client(format!("Invalid User-Agent: {}", e)))?,
        );

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http_client })
    }

    /// Default timeout and User-Agent
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(DEFAULT_TIMEOUT, USER_AGENT)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!(url = %url, "GET");

        let response = self.http_client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url = %url, status, bytes = body.len(), "Response received");
        Ok(FetchedPage { status, body })
    }
}
