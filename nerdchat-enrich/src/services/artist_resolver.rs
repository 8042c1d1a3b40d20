//! Artist resolver: known-ID lookup, throttled fetch, HTML extraction
//!
//! Only curated artists are ever fetched. An identifier missing from the
//! registry resolves to `None` without touching the network.
//!
//! # Extraction
//! - `raw_text`: every text node of the page except script/style content,
//!   whitespace collapsed
//! - `social_links` / `platform_links`: `<a href>` elements classified by URL
//!   markers, keyed by visible link text (the href itself for icon-only links)
//!
//! Extraction is best effort. Malformed HTML still yields a document, possibly
//! with empty link maps.

use super::link_classifier::{LinkBucket, LinkClassifier};
use super::page_fetcher::PageFetcher;
use super::rate_limiter::RateLimiter;
use crate::models::{ArtistDocument, LinkMap};
use crate::registry::ArtistRegistry;
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Elements whose text never reaches `raw_text`
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Anything that can turn an artist identifier into a document
///
/// Implemented by [`ArtistResolver`]; the enrichment service depends only on
/// this trait so tests can substitute a scripted source.
#[async_trait]
pub trait ArtistSource: Send + Sync {
    /// Resolve one artist; `None` for unknown artists and failed fetches
    async fn resolve(&self, identifier: &str) -> Option<ArtistDocument>;
}

/// Fetch-and-extract resolver for one external origin
pub struct ArtistResolver {
    registry: Arc<ArtistRegistry>,
    fetcher: Arc<dyn PageFetcher>,
    /// One limiter per origin, shared by every resolve call
    rate_limiter: RateLimiter,
    classifier: LinkClassifier,
    base_url: String,
}

impl ArtistResolver {
    pub fn new(
        registry: Arc<ArtistRegistry>,
        fetcher: Arc<dyn PageFetcher>,
        rate_limiter: RateLimiter,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            rate_limiter,
            classifier: LinkClassifier::default(),
            base_url: base_url.into(),
        }
    }

    /// Replace the built-in link rules
    pub fn with_classifier(mut self, classifier: LinkClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Page URL for an external artist ID
    pub fn artist_url(&self, external_id: &str) -> String {
        format!("{}/artist/{}", self.base_url.trim_end_matches('/'), external_id)
    }
}

#[async_trait]
impl ArtistSource for ArtistResolver {
    async fn resolve(&self, identifier: &str) -> Option<ArtistDocument> {
        let Some(entry) = self.registry.get(identifier) else {
            info!(artist = %identifier, "No known ID for artist, not fetching");
            return None;
        };

        let url = self.artist_url(&entry.external_id);

        self.rate_limiter.wait_if_needed().await;

        info!(artist = %entry.display_name, url = %url, "Fetching artist page");
        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    artist = %entry.display_name,
                    url = %url,
                    error = %e,
                    "Artist page fetch failed"
                );
                return None;
            }
        };

        if !page.is_success() {
            warn!(
                artist = %entry.display_name,
                url = %url,
                status = page.status,
                "Artist page returned non-success status"
            );
            return None;
        }

        let document = extract_document(&entry.display_name, &url, &page.body, &self.classifier);

        info!(
            artist = %document.name,
            text_chars = document.raw_text.chars().count(),
            social_links = document.social_links.len(),
            platform_links = document.platform_links.len(),
            "Extracted artist page"
        );

        Some(document)
    }
}

/// Build a document from an artist page body
pub fn extract_document(
    name: &str,
    source_url: &str,
    body: &str,
    classifier: &LinkClassifier,
) -> ArtistDocument {
    let html = Html::parse_document(body);

    if !html.errors.is_empty() {
        debug!(
            url = %source_url,
            parse_errors = html.errors.len(),
            "HTML parsed with recoverable errors"
        );
    }

    let raw_text = extract_text(&html);
    let (social_links, platform_links) = extract_links(&html, classifier);

    ArtistDocument {
        name: name.to_string(),
        source_url: source_url.to_string(),
        raw_text,
        social_links,
        platform_links,
    }
}

/// De-tagged document text with whitespace runs collapsed
fn extract_text(html: &Html) -> String {
    let mut text = String::new();

    for node in html.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            // Separate nodes so adjacent block elements never run together
            text.push_str(fragment);
            text.push(' ');
        }
    }

    collapse_whitespace(&text)
}

/// Classified `<a href>` links as (social, platform)
fn extract_links(html: &Html, classifier: &LinkClassifier) -> (LinkMap, LinkMap) {
    let mut social = LinkMap::new();
    let mut platform = LinkMap::new();

    for element in html.root_element().descendants().filter_map(ElementRef::wrap) {
        if element.value().name() != "a" {
            continue;
        }
        let Some(href) = element.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        let Some(bucket) = classifier.classify(href) else {
            continue;
        };

        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        let label = if text.is_empty() { href.to_string() } else { text };

        match bucket {
            LinkBucket::Social => social.insert(label, href.to_string()),
            LinkBucket::Platform => platform.insert(label, href.to_string()),
        };
    }

    (social, platform)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Latasha | MusicNerd</title>
  <style>body { color: red; }</style>
  <script>window.__DATA__ = {"secret": true};</script>
</head>
<body>
  <h1>Latasha</h1>
  <p>Seattle   rapper and
     web3 pioneer.</p>
  <a href="https://www.instagram.com/latasha">Instagram</a>
  <a href="https://twitter.com/latasha">  Twitter </a>
  <a href="https://open.spotify.com/artist/abc">Spotify</a>
  <a href="https://soundcloud.com/latasha"><img src="sc.png"></a>
  <a href="/about">About MusicNerd</a>
  <a>No href</a>
</body>
</html>"#;

    fn extract(body: &str) -> ArtistDocument {
        extract_document(
            "Latasha",
            "https://www.musicnerd.xyz/artist/l1",
            body,
            &LinkClassifier::default(),
        )
    }

    #[test]
    fn test_extracts_text_without_scripts() {
        let document = extract(PAGE);
        assert!(document.raw_text.contains("Latasha | MusicNerd"));
        assert!(document.raw_text.contains("Seattle rapper and web3 pioneer."));
        assert!(!document.raw_text.contains("__DATA__"));
        assert!(!document.raw_text.contains("color: red"));
        assert!(!document.raw_text.contains("  "));
    }

    #[test]
    fn test_minified_blocks_keep_word_boundaries() {
        let document = extract(
            "<h1>Latasha</h1><p>Seattle rapper</p><ul><li>one</li><li>two</li></ul>",
        );
        assert_eq!(document.raw_text, "Latasha Seattle rapper one two");
    }

    #[test]
    fn test_classifies_links() {
        let document = extract(PAGE);

        assert_eq!(document.social_links.len(), 2);
        assert_eq!(
            document.social_links.get("Instagram").map(String::as_str),
            Some("https://www.instagram.com/latasha")
        );
        assert_eq!(
            document.social_links.get("Twitter").map(String::as_str),
            Some("https://twitter.com/latasha")
        );

        assert_eq!(document.platform_links.len(), 2);
        assert_eq!(
            document.platform_links.get("Spotify").map(String::as_str),
            Some("https://open.spotify.com/artist/abc")
        );
        // Icon-only link falls back to the href as label
        assert_eq!(
            document
                .platform_links
                .get("https://soundcloud.com/latasha")
                .map(String::as_str),
            Some("https://soundcloud.com/latasha")
        );
    }

    #[test]
    fn test_document_metadata() {
        let document = extract(PAGE);
        assert_eq!(document.name, "Latasha");
        assert_eq!(document.source_url, "https://www.musicnerd.xyz/artist/l1");
    }

    #[test]
    fn test_malformed_html_is_partial_not_fatal() {
        let document = extract("<div><p>Unclosed <a href='https://spotify.com/x'>Listen");
        assert!(document.raw_text.contains("Unclosed"));
        assert!(document.raw_text.contains("Listen"));
        assert_eq!(document.platform_links.len(), 1);
    }

    #[test]
    fn test_empty_body() {
        let document = extract("");
        assert_eq!(document.raw_text, "");
        assert!(!document.has_links());
    }

    #[test]
    fn test_duplicate_label_last_wins() {
        let document = extract(
            r#"<a href="https://instagram.com/old">Instagram</a>
               <a href="https://instagram.com/new">Instagram</a>"#,
        );
        assert_eq!(
            document.social_links.get("Instagram").map(String::as_str),
            Some("https://instagram.com/new")
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
