//! Language-model and embedding backends
//!
//! The extraction engine and the retrieval index only see the
//! [`LanguageModel`] and [`Embedder`] traits. The OpenAI-compatible REST
//! implementations live in [`openai`]; tests substitute scripted doubles.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::{OpenAiChatModel, OpenAiClient, OpenAiEmbedder};

/// Errors from a model or embedding backend
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Missing credential or unusable client settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response or an empty answer
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Single-prompt text completion
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Batch text embedding; output order matches input order
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}
