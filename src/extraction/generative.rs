//! Retrieval-augmented extraction through a language model

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::record::ExtractionRecord;
use super::{ExtractionError, ExtractionInput, Extractor};
use crate::content::Chunk;
use crate::llm::LanguageModel;
use crate::retrieval::RetrievalIndex;

/// Retrieval query used to pick context chunks
pub const CONTEXT_QUERY: &str = "Extract full structured company information.";

pub struct GenerativeExtractor {
    model: Arc<dyn LanguageModel>,
    index: Option<Arc<RetrievalIndex>>,
    top_k: usize,
}

impl GenerativeExtractor {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, top_k: usize) -> Self {
        Self {
            model,
            index: None,
            top_k: top_k.max(1),
        }
    }

    #[must_use]
    pub fn with_index(mut self, index: Arc<RetrievalIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Top-k retrieved chunks, or the first k chunks when retrieval is
    /// unavailable, failing or empty
    async fn select_context(&self, chunks: &[Chunk], site_url: &str) -> Vec<String> {
        if let Some(index) = &self.index {
            let retrieved = match index.index(chunks, site_url).await {
                Ok(_) => index.query(site_url, CONTEXT_QUERY, self.top_k).await,
                Err(e) => Err(e),
            };
            match retrieved {
                Ok(found) if !found.is_empty() => {
                    debug!(site = %site_url, chunks = found.len(), "Using retrieved context");
                    return found.into_iter().map(|c| c.text).collect();
                }
                Ok(_) => debug!(site = %site_url, "Retrieval returned nothing, using leading chunks"),
                Err(e) => warn!(site = %site_url, error = %e, "Retrieval failed, using leading chunks"),
            }
        }
        chunks.iter().take(self.top_k).map(|c| c.text.clone()).collect()
    }
}

impl std::fmt::Debug for GenerativeExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeExtractor")
            .field("retrieval", &self.index.is_some())
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Extractor for GenerativeExtractor {
    async fn extract(&self, input: &ExtractionInput<'_>) -> Result<ExtractionRecord, ExtractionError> {
        let context = self.select_context(input.chunks, input.site_url).await;
        let prompt = build_prompt(input.site_url, &context.join(" "));
        let raw = self.model.complete(&prompt).await?;
        Ok(parse_generative_output(&raw))
    }
}

/// Extraction prompt asking for a strict JSON object with the twelve keys
#[must_use]
pub fn build_prompt(site_url: &str, context: &str) -> String {
    format!(
        "You are a professional data extraction assistant.
From the provided text, extract detailed company data.
Return STRICT JSON (no markdown, no explanation).

Keys:
- Business Name
- About Us
- Main Services (as list)
- Email
- Phone
- Address
- Facebook
- Instagram
- LinkedIn
- Twitter / X
- Description
- URL

Website: {site_url}

Text:
{context}
"
    )
}

/// Remove a surrounding markdown code fence, with or without a `json` tag
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse model output into a record, or a diagnostic record carrying the text
#[must_use]
pub fn parse_generative_output(raw: &str) -> ExtractionRecord {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str::<serde_json::Value>(cleaned)
        .ok()
        .and_then(|value| ExtractionRecord::from_generative_value(&value))
        .unwrap_or_else(|| {
            debug!("Generative output is not a JSON object");
            ExtractionRecord::diagnostic(cleaned)
        })
}
