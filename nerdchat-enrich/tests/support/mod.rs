//! Test support for nerdchat-enrich integration tests
//!
//! Scripted `PageFetcher` with call counting, plus registry and page fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use nerdchat_common::config::{ArtistConfig, TomlConfig};
use nerdchat_enrich::error::FetchError;
use nerdchat_enrich::registry::{ArtistEntry, ArtistRegistry};
use nerdchat_enrich::services::{FetchedPage, PageFetcher};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

pub const LATASHA_ID: &str = "3cd4c3e4-4bf4-4b92-9b72-07f9188bd4c6";
pub const BASE_URL: &str = "https://www.musicnerd.xyz";

/// One scripted transport outcome
#[derive(Debug, Clone)]
pub enum MockResponse {
    Page { status: u16, body: String },
    NetworkError,
    Timeout,
}

impl MockResponse {
    pub fn ok(body: &str) -> Self {
        MockResponse::Page {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        MockResponse::Page {
            status,
            body: format!("<html><body>Error {}</body></html>", status),
        }
    }
}

/// Fetcher that replays scripted responses and records every request
///
/// Once the script runs out, the last response repeats.
pub struct MockFetcher {
    script: Mutex<VecDeque<MockResponse>>,
    fallback: MockResponse,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, Instant)>>,
}

impl MockFetcher {
    pub fn new(responses: Vec<MockResponse>) -> Arc<Self> {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or_else(|| MockResponse::status(404));
        Arc::new(Self {
            script: Mutex::new(responses.into()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn always(response: MockResponse) -> Arc<Self> {
        Self::new(vec![response])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match response {
            MockResponse::Page { status, body } => Ok(FetchedPage { status, body }),
            MockResponse::NetworkError => {
                Err(FetchError::Network("connection refused".to_string()))
            }
            MockResponse::Timeout => Err(FetchError::Timeout("operation timed out".to_string())),
        }
    }
}

/// Registry with the four artists the assistant knows about
pub fn test_registry() -> Arc<ArtistRegistry> {
    Arc::new(ArtistRegistry::new(
        [
            ("disclosure", "Disclosure", "d-0001"),
            ("bicep", "Bicep", "b-0002"),
            ("fred again", "Fred again..", "f-0003"),
            ("latasha", "Latasha", LATASHA_ID),
        ]
        .into_iter()
        .map(|(identifier, name, id)| ArtistEntry {
            identifier: identifier.to_string(),
            display_name: name.to_string(),
            external_id: id.to_string(),
        }),
    ))
}

/// Config carrying the same artists, fast enough for tests
pub fn test_config(requests_per_minute: u32) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.source.requests_per_minute = requests_per_minute;
    config.artists = test_registry()
        .iter()
        .map(|entry| ArtistConfig {
            name: entry.display_name.clone(),
            external_id: entry.external_id.clone(),
            identifier: Some(entry.identifier.clone()),
        })
        .collect();
    config
}

/// Artist page shaped like a MusicNerd profile
pub fn artist_page(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name} | MusicNerd</title><script>var tracking = 1;</script></head>
<body>
  <h1>{name}</h1>
  <p>{name} makes records.</p>
  <a href="https://www.instagram.com/{slug}">Instagram</a>
  <a href="https://x.com/{slug}">X</a>
  <a href="https://open.spotify.com/artist/{slug}">Spotify</a>
  <a href="https://soundcloud.com/{slug}">SoundCloud</a>
  <a href="https://www.musicnerd.xyz/about">About</a>
</body>
</html>"#,
        name = name,
        slug = name.to_lowercase().replace(' ', "")
    )
}
