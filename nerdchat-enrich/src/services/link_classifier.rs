//! Best-effort link classification
//!
//! Rules are an ordered list of (markers, bucket) pairs evaluated first match
//! wins, so new platforms are a data change, not a control-flow change.

use nerdchat_common::config::LinkRulesConfig;
use serde::{Deserialize, Serialize};

/// Destination bucket for a classified link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkBucket {
    Social,
    Platform,
}

/// Markers routed to one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRule {
    pub bucket: LinkBucket,
    /// Lower-cased substrings matched against the lower-cased URL
    pub markers: Vec<String>,
}

impl LinkRule {
    pub fn new<I, S>(bucket: LinkBucket, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            bucket,
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    fn matches(&self, url_lower: &str) -> bool {
        self.markers.iter().any(|marker| url_lower.contains(marker.as_str()))
    }
}

const DEFAULT_SOCIAL_MARKERS: &[&str] = &["instagram", "twitter", "//x.com/", "tiktok", "facebook"];
const DEFAULT_PLATFORM_MARKERS: &[&str] = &[
    "spotify",
    "soundcloud",
    "bandcamp",
    "music.apple.com",
    "youtube",
];

/// Ordered rule set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClassifier {
    rules: Vec<LinkRule>,
}

impl LinkClassifier {
    pub fn new(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }

    /// Social rules then platform rules, from configuration
    pub fn from_config(config: &LinkRulesConfig) -> Self {
        Self::new(vec![
            LinkRule::new(LinkBucket::Social, &config.social),
            LinkRule::new(LinkBucket::Platform, &config.platform),
        ])
    }

    /// Bucket of the first rule with a marker contained in `url`, if any
    pub fn classify(&self, url: &str) -> Option<LinkBucket> {
        let url_lower = url.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&url_lower))
            .map(|rule| rule.bucket)
    }

    pub fn rules(&self) -> &[LinkRule] {
        &self.rules
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new(vec![
            LinkRule::new(LinkBucket::Social, DEFAULT_SOCIAL_MARKERS),
            LinkRule::new(LinkBucket::Platform, DEFAULT_PLATFORM_MARKERS),
        ])
    }
}
