//! Text preparation: markup normalization and chunking

pub mod chunker;
pub mod normalizer;

pub use chunker::{chunk_document, chunk_text, Chunk, ChunkError};
pub use normalizer::{normalize, visible_lines};

/// Text of one successfully rendered page
///
/// The markup is kept alongside the plain text for the heuristics that read
/// links, meta tags and page chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub url: String,
    pub plain_text: String,
    pub markup: String,
}
