//! Vector store trait for storing and searching evidence embeddings.

use async_trait::async_trait;

use crate::document::{IndexedRecord, RetrievedCandidate};
use crate::error::Result;

/// A storage backend for embedded evidence with similarity search.
///
/// Implementations manage named collections of [`IndexedRecord`]s. The
/// [`KnowledgeBase`](crate::KnowledgeBase) drives a store through a
/// drop-create-insert cycle on every build, so a backend does not need to
/// support in-place updates.
///
/// # Example
///
/// ```rust,ignore
/// use factcheck_rag::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("evidence", 1536).await?;
/// store.insert("evidence", &records).await?;
/// let hits = store.search("evidence", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named, empty collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data. No-op if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Append records to a collection, preserving their order.
    async fn insert(&self, collection: &str, records: &[IndexedRecord]) -> Result<()>;

    /// Search for the `top_k` most similar records to the given embedding.
    ///
    /// Returns candidates ordered by descending similarity.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedCandidate>>;
}
