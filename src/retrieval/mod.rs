//! Optional similarity index over chunk embeddings
//!
//! Chunks are stored per source URL namespace and keyed by
//! `{source_url}_{sequence_index}`. Indexing the same source again
//! overwrites by key and drops windows the new text no longer has.
//! Writes to one namespace are serialized by its lock; queries against
//! other namespaces proceed concurrently.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::content::Chunk;
use crate::llm::{Embedder, LlmError};

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),

    #[error("embedder returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

type Namespace = Arc<RwLock<HashMap<String, Chunk>>>;

/// Process-lifetime chunk index shared across runs
pub struct RetrievalIndex {
    embedder: Arc<dyn Embedder>,
    namespaces: DashMap<String, Namespace>,
}

impl std::fmt::Debug for RetrievalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalIndex")
            .field("namespaces", &self.namespaces.len())
            .finish_non_exhaustive()
    }
}

impl RetrievalIndex {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            namespaces: DashMap::new(),
        }
    }

    fn namespace(&self, source_url: &str) -> Namespace {
        Arc::clone(&self.namespaces.entry(source_url.to_string()).or_default())
    }

    /// Embed and store chunks under `source_url`
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError` when the embedder fails; nothing is written in
    /// that case.
    pub async fn index(&self, chunks: &[Chunk], source_url: &str) -> Result<usize, RetrievalError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(RetrievalError::CountMismatch {
                expected: chunks.len(),
                got: vectors.len(),
            });
        }

        let namespace = self.namespace(source_url);
        let mut entries = namespace.write().await;
        let fresh: HashMap<String, Chunk> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                let stored = Chunk {
                    source_url: source_url.to_string(),
                    sequence_index: chunk.sequence_index,
                    text: chunk.text.clone(),
                    embedding: Some(vector),
                };
                (stored.key(), stored)
            })
            .collect();
        entries.retain(|key, _| fresh.contains_key(key));
        entries.extend(fresh);

        debug!(source = %source_url, chunks = entries.len(), "Indexed chunks");
        Ok(entries.len())
    }

    /// Top-`k` chunks of `source_url` by cosine similarity to `text`
    ///
    /// Ties keep document order. An unknown namespace yields no chunks.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError` when the query cannot be embedded.
    pub async fn query(
        &self,
        source_url: &str,
        text: &str,
        k: usize,
    ) -> Result<Vec<Chunk>, RetrievalError> {
        let Some(namespace) = self.namespaces.get(source_url).map(|ns| Arc::clone(&ns)) else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        let Some(query) = vectors.pop() else {
            return Err(RetrievalError::CountMismatch { expected: 1, got: 0 });
        };

        let entries = namespace.read().await;
        let mut scored: Vec<(f32, &Chunk)> = entries
            .values()
            .map(|chunk| {
                let score = chunk
                    .embedding
                    .as_deref()
                    .map_or(0.0, |e| cosine_similarity(&query, e));
                (score, chunk)
            })
            .collect();
        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then(a.1.sequence_index.cmp(&b.1.sequence_index))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| chunk.clone())
            .collect())
    }

    /// Number of chunks stored for a source
    pub async fn chunk_count(&self, source_url: &str) -> usize {
        match self.namespaces.get(source_url).map(|ns| Arc::clone(&ns)) {
            Some(namespace) => namespace.read().await.len(),
            None => 0,
        }
    }

    pub fn remove(&self, source_url: &str) {
        self.namespaces.remove(source_url);
    }
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Two-dimensional embedding: (mentions "contact", mentions "rocket")
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        f32::from(u8::from(t.contains("contact"))),
                        f32::from(u8::from(t.contains("rocket"))),
                    ]
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            Err(LlmError::Network("connection refused".into()))
        }
    }

    fn chunk(seq: usize, text: &str) -> Chunk {
        Chunk {
            source_url: "https://acme.io".into(),
            sequence_index: seq,
            text: text.into(),
            embedding: None,
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn query_ranks_by_similarity() {
        let index = RetrievalIndex::new(Arc::new(KeywordEmbedder));
        let chunks = vec![
            chunk(0, "we build rockets"),
            chunk(1, "contact us today"),
            chunk(2, "unrelated words"),
        ];
        index.index(&chunks, "https://acme.io").await.unwrap();

        let top = index.query("https://acme.io", "contact", 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].sequence_index, 1);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let index = RetrievalIndex::new(Arc::new(KeywordEmbedder));
        index
            .index(&[chunk(0, "contact a")], "https://a.io")
            .await
            .unwrap();
        assert!(index.query("https://b.io", "contact", 3).await.unwrap().is_empty());
        assert_eq!(index.chunk_count("https://a.io").await, 1);
    }

    #[tokio::test]
    async fn reindex_overwrites_by_key() {
        let index = RetrievalIndex::new(Arc::new(KeywordEmbedder));
        index
            .index(&[chunk(0, "old"), chunk(1, "old two")], "https://acme.io")
            .await
            .unwrap();
        index
            .index(&[chunk(0, "new contact")], "https://acme.io")
            .await
            .unwrap();

        assert_eq!(index.chunk_count("https://acme.io").await, 1);
        let top = index.query("https://acme.io", "contact", 3).await.unwrap();
        assert_eq!(top[0].text, "new contact");
    }

    #[tokio::test]
    async fn embedder_failure_writes_nothing() {
        let index = RetrievalIndex::new(Arc::new(FailingEmbedder));
        let err = index
            .index(&[chunk(0, "x")], "https://acme.io")
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Embedding(LlmError::Network(_))));
        assert_eq!(index.chunk_count("https://acme.io").await, 0);
    }
}
