//! Enrichment pipeline services
//!
//! Leaf first:
//! - `rate_limiter`: minimum spacing between fetches to the external origin
//! - `page_fetcher`: outbound HTTP seam
//! - `link_classifier`: ordered marker rules for social/platform links
//! - `artist_resolver`: known-ID lookup, throttled fetch, HTML extraction
//! - `enrichment_service`: cache-first resolution
//! - `mention_extractor`: known artists in free text
//! - `context_assembler`: one chat turn end to end

pub mod artist_resolver;
pub mod context_assembler;
pub mod enrichment_service;
pub mod link_classifier;
pub mod mention_extractor;
pub mod page_fetcher;
pub mod rate_limiter;

pub use artist_resolver::{extract_document, ArtistResolver, ArtistSource};
pub use context_assembler::{build_context_block, ContextAssembler, TurnContext};
pub use enrichment_service::{EnrichmentService, NegativeCaching, DEFAULT_MAX_AGE};
pub use link_classifier::{LinkBucket, LinkClassifier, LinkRule};
pub use mention_extractor::{
    policy_for, MatchPolicy, MentionExtractor, SubstringMatch, WholeWordMatch,
};
pub use page_fetcher::{FetchedPage, HttpPageFetcher, PageFetcher};
pub use rate_limiter::RateLimiter;
