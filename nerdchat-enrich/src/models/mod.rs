//! Data models for nerdchat-enrich

pub mod artist_document;
pub mod cache_entry;

pub use artist_document::{ArtistDocument, LinkMap};
pub use cache_entry::CacheEntry;
