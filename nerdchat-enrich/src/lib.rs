//! nerdchat-enrich library interface
//!
//! Artist-data enrichment for the chat assistant: recognizes known artists in
//! user text and resolves their MusicNerd pages through a freshness cache and
//! a rate-limited fetcher.
//!
//! Entry points for the chat layer:
//! - [`services::MentionExtractor::find_mentions`]
//! - [`services::EnrichmentService::get_artist_info`]

pub mod cache;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod services;

pub use crate::error::{FetchError, StoreError};
pub use crate::models::ArtistDocument;
pub use crate::pipeline::{build_pipeline, build_pipeline_with, Pipeline};
pub use crate::registry::{ArtistEntry, ArtistRegistry};
