//! OpenAI-compatible REST client for chat completions and embeddings

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{Embedder, LanguageModel, LlmError};
use crate::config::SiteBotConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Minimal HTTP client for an OpenAI-compatible API
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client, routing requests through `proxy` when given
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` for an empty key, an unparseable proxy URL
    /// or a TLS backend that fails to initialize.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        proxy: Option<&str>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".into()));
        }

        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| LlmError::Config(format!("Invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let http_client = builder
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One user message in, the first choice's content out
    pub async fn chat_completion(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let start = Instant::now();
        let request = ChatRequest {
            model,
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat completion request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(LlmError::Api(format!("{status}: {error_text}")));
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Api("No choices in completion response".into()))?;

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion"
        );
        Ok(content)
    }

    /// Embed a batch of texts, returned in input order
    pub async fn create_embeddings(
        &self,
        model: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http_client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&EmbeddingRequest { model, input: texts })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Embedding request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Embedding API error");
            return Err(LlmError::Api(format!("{status}: {error_text}")));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(LlmError::Parse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Chat completion model at temperature 0
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: OpenAiClient,
    model: String,
}

impl OpenAiChatModel {
    #[must_use]
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Build from config; `Ok(None)` when no completion key is configured
    ///
    /// # Errors
    ///
    /// Propagates client construction failures.
    pub fn from_config(config: &SiteBotConfig) -> Result<Option<Self>, LlmError> {
        let Some(key) = config.openai_api_key() else {
            return Ok(None);
        };
        let client = OpenAiClient::new(key, config.openai_base_url(), config.proxy())?;
        Ok(Some(Self::new(client, config.completion_model())))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.client.chat_completion(&self.model, prompt, 0.0).await
    }
}

/// Embedding model behind the `/embeddings` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    #[must_use]
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Build from config; `Ok(None)` when no embedding key is configured
    ///
    /// # Errors
    ///
    /// Propagates client construction failures.
    pub fn from_config(config: &SiteBotConfig) -> Result<Option<Self>, LlmError> {
        let Some(key) = config.embedding_api_key() else {
            return Ok(None);
        };
        let client = OpenAiClient::new(key, config.openai_base_url(), config.proxy())?;
        Ok(Some(Self::new(client, config.embedding_model())))
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.client.create_embeddings(&self.model, texts).await
    }
}
