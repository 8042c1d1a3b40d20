//! Per-turn context assembly
//!
//! Runs one chat turn through the pipeline: find mentions, resolve each
//! artist, and build the context block the chat layer prepends to the
//! user's message. Artists without a document are left out; the chat layer
//! answers without them.

use super::enrichment_service::EnrichmentService;
use super::mention_extractor::MentionExtractor;
use crate::models::ArtistDocument;
use nerdchat_common::config::DEFAULT_CONTEXT_CHARS;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything the pipeline found for one user message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnContext {
    /// Mentioned artists, canonical names
    pub artists: Vec<String>,
    /// Documents for the artists that resolved
    pub documents: Vec<ArtistDocument>,
    /// Text to hand to the language model, if any artist resolved
    pub context_block: Option<String>,
}

impl TurnContext {
    /// User message with the context block prepended
    pub fn decorate(&self, user_text: &str) -> String {
        match &self.context_block {
            Some(block) => format!("[Context: {}] {}", block, user_text),
            None => user_text.to_string(),
        }
    }
}

/// Mentions → documents → context block
pub struct ContextAssembler {
    extractor: Arc<MentionExtractor>,
    enrichment: EnrichmentService,
    max_chars: usize,
}

impl ContextAssembler {
    pub fn new(extractor: Arc<MentionExtractor>, enrichment: EnrichmentService) -> Self {
        Self {
            extractor,
            enrichment,
            max_chars: DEFAULT_CONTEXT_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Resolve every artist mentioned in `user_text`
    ///
    /// Lookups run one after another so they queue on the shared rate
    /// limiter in mention order.
    pub async fn enrich_turn(&self, user_text: &str) -> TurnContext {
        let entries = self.extractor.find_entries(user_text);
        if entries.is_empty() {
            debug!("No known artists mentioned");
            return TurnContext::default();
        }

        let artists: Vec<String> = entries.iter().map(|e| e.display_name.clone()).collect();
        info!(artists = ?artists, "Found artists");

        let mut documents = Vec::with_capacity(entries.len());
        for entry in &entries {
            let document = self
                .enrichment
                .get_artist_info_default(&entry.identifier)
                .await;
            if let Some(document) = document {
                documents.push(document);
            }
        }

        let context_block = build_context_block(&documents, self.max_chars);
        TurnContext {
            artists,
            documents,
            context_block,
        }
    }
}

/// One paragraph per document, `None` when there are no documents
pub fn build_context_block(documents: &[ArtistDocument], max_chars: usize) -> Option<String> {
    if documents.is_empty() {
        return None;
    }

    let mut block = String::new();
    for document in documents {
        block.push_str(&format!(
            "\nInformation about {} from {}:\n{}\n",
            document.name,
            document.source_url,
            document.excerpt(max_chars)
        ));
    }
    Some(block)
}
