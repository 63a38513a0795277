//! Overlapping fixed-size word windows
//!
//! Window `i` covers words `[i * step, i * step + size)` where
//! `step = size - overlap`. The last window may be shorter.

use serde::{Deserialize, Serialize};

/// One window of a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub source_url: String,
    /// Strictly increasing per source, starting at 0
    pub sequence_index: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Retrieval index key: `{source_url}_{sequence_index}`
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}_{}", self.source_url, self.sequence_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("chunk size must be greater than zero")]
    ZeroSize,

    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// Split text into overlapping word windows
///
/// # Errors
///
/// Returns `ChunkError` when `size` is zero or `overlap >= size`, before
/// looking at the text.
///
/// # Examples
/// ```
/// # use kodegen_tools_sitebot::content::chunk_text;
/// let chunks = chunk_text("a b c d e", 3, 1).unwrap();
/// assert_eq!(chunks, vec!["a b c", "c d e", "e"]);
/// ```
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>, ChunkError> {
    if size == 0 {
        return Err(ChunkError::ZeroSize);
    }
    if overlap >= size {
        return Err(ChunkError::OverlapTooLarge { size, overlap });
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let step = size - overlap;

    let mut chunks = Vec::with_capacity(words.len().div_ceil(step));
    let mut start = 0;
    while start < words.len() {
        let end = (start + size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += step;
    }
    Ok(chunks)
}

/// Chunk a document and tag each window with its source and sequence index
///
/// # Errors
///
/// Same as [`chunk_text`].
pub fn chunk_document(
    source_url: &str,
    text: &str,
    size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, ChunkError> {
    Ok(chunk_text(text, size, overlap)?
        .into_iter()
        .enumerate()
        .map(|(sequence_index, text)| Chunk {
            source_url: source_url.to_string(),
            sequence_index,
            text,
            embedding: None,
        })
        .collect())
}
