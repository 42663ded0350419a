//! Data types for source documents, evidence chunks, and search results.

use serde::{Deserialize, Serialize};

/// A cleaned reference document: the text extracted from one source URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    /// URI the text was extracted from.
    pub source: String,
    /// Plain text content.
    pub text: String,
}

impl SourceDocument {
    /// Create a document from a source URI and its text.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }
}

/// A window of a [`SourceDocument`], the unit that gets embedded and indexed.
///
/// One chunk maps to exactly one embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceChunk {
    /// URI of the parent document.
    pub source: String,
    /// The chunk text.
    pub text: String,
}

impl EvidenceChunk {
    /// Create a chunk from a source URI and its text.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }
}

/// An [`EvidenceChunk`] with its embedding attached, as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedRecord {
    /// The embedding of `text`.
    pub vector: Vec<f32>,
    /// The chunk text.
    pub text: String,
    /// URI of the parent document.
    pub source: String,
}

/// A record returned by vector search together with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedCandidate {
    /// The chunk text.
    pub text: String,
    /// URI of the parent document.
    pub source: String,
    /// Cosine similarity between the query vector and the record vector.
    pub raw_similarity: f32,
}

/// A candidate promoted by reranking; evidence shown to the adjudicator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceItem {
    /// The chunk text.
    pub text: String,
    /// URI of the parent document.
    pub source: String,
}

impl From<&RetrievedCandidate> for EvidenceItem {
    fn from(candidate: &RetrievedCandidate) -> Self {
        Self { text: candidate.text.clone(), source: candidate.source.clone() }
    }
}
