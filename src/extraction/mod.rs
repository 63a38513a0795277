//! Business-record extraction
//!
//! Two strategies share the [`Extractor`] contract: a deterministic
//! [`HeuristicExtractor`] that always runs, and an optional
//! [`GenerativeExtractor`] backed by a language model. The engine runs both
//! and [`reconcile::merge`] combines them.

pub mod generative;
pub mod heuristic;
pub mod reconcile;
pub mod record;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SiteBotConfig;
use crate::content::{Chunk, NormalizedDocument};
use crate::llm::{LlmError, OpenAiChatModel, OpenAiEmbedder};
use crate::retrieval::RetrievalIndex;

pub use generative::GenerativeExtractor;
pub use heuristic::HeuristicExtractor;
pub use reconcile::merge;
pub use record::{ExtractionRecord, TextField, CANONICAL_KEYS};

#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("language model failed: {0}")]
    Model(#[from] LlmError),
}

/// Everything an extractor may look at for one site
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    /// Scheme-normalized site URL as supplied by the caller
    pub site_url: &'a str,
    pub aggregated_text: &'a str,
    pub chunks: &'a [Chunk],
    pub pages: &'a [NormalizedDocument],
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, input: &ExtractionInput<'_>) -> Result<ExtractionRecord, ExtractionError>;
}

/// Output of both strategies before reconciliation
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub heuristic: ExtractionRecord,
    pub generative: Option<ExtractionRecord>,
}

/// Runs the heuristic extractor and, when configured, the generative one
#[derive(Debug)]
pub struct ExtractionEngine {
    heuristic: HeuristicExtractor,
    generative: Option<GenerativeExtractor>,
}

impl ExtractionEngine {
    #[must_use]
    pub fn heuristic_only() -> Self {
        Self {
            heuristic: HeuristicExtractor::new(),
            generative: None,
        }
    }

    #[must_use]
    pub fn with_generative(generative: GenerativeExtractor) -> Self {
        Self {
            heuristic: HeuristicExtractor::new(),
            generative: Some(generative),
        }
    }

    /// Build the engine from configuration
    ///
    /// Without a completion key the engine is heuristic-only. The retrieval
    /// index is attached when an embedding key is available; `index` lets
    /// callers share one index across engines.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` when a configured client cannot be built.
    pub fn from_config(
        config: &SiteBotConfig,
        index: Option<Arc<RetrievalIndex>>,
    ) -> Result<Self, LlmError> {
        let Some(model) = OpenAiChatModel::from_config(config)? else {
            debug!("No completion key configured, generative extraction disabled");
            return Ok(Self::heuristic_only());
        };

        let mut generative = GenerativeExtractor::new(Arc::new(model), config.retrieval_top_k());
        let index = match index {
            Some(index) => Some(index),
            None => OpenAiEmbedder::from_config(config)?
                .map(|embedder| Arc::new(RetrievalIndex::new(Arc::new(embedder)))),
        };
        if let Some(index) = index {
            generative = generative.with_index(index);
        }
        Ok(Self::with_generative(generative))
    }

    #[must_use]
    pub fn generative_enabled(&self) -> bool {
        self.generative.is_some()
    }

    /// Run both strategies; a model failure only drops the generative record
    pub async fn run(&self, input: &ExtractionInput<'_>) -> ExtractionOutcome {
        let heuristic = self.heuristic.extract_record(input);

        let generative = match &self.generative {
            Some(extractor) => match extractor.extract(input).await {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(site = %input.site_url, error = %e, "Generative extraction failed, using heuristics only");
                    None
                }
            },
            None => None,
        };

        ExtractionOutcome {
            heuristic,
            generative,
        }
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::heuristic_only()
    }
}
