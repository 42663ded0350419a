//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], a
//! sliding window over character (code point) offsets.

use crate::document::{EvidenceChunk, SourceDocument};

/// A strategy for splitting documents into evidence chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &SourceDocument) -> Vec<EvidenceChunk>;

    /// Chunk several documents, concatenating the results in document order.
    fn chunk_all(&self, documents: &[SourceDocument]) -> Vec<EvidenceChunk> {
        documents.iter().flat_map(|doc| self.chunk(doc)).collect()
    }
}

/// Splits text into fixed-size windows by character count with overlap.
///
/// Windows start at `0, step, 2*step, ...` where `step = chunk_size - chunk_overlap`,
/// and the final partial window is kept. Offsets count Unicode scalar values,
/// so multi-byte text is never split inside a character.
///
/// # Example
///
/// ```rust,ignore
/// use factcheck_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(500, 50);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &SourceDocument) -> Vec<EvidenceChunk> {
        let text = &document.text;
        if text.is_empty() || self.chunk_size == 0 {
            return Vec::new();
        }

        // Byte offset of every character, plus the end of the string.
        let offsets: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_count = offsets.len() - 1;
        let step = self.chunk_size.saturating_sub(self.chunk_overlap);

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(EvidenceChunk::new(
                document.source.clone(),
                &text[offsets[start]..offsets[end]],
            ));
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}
