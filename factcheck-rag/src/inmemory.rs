//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a brute-force vector store
//! backed by a `HashMap` of record lists protected by a `tokio::sync::RwLock`.
//! The evidence corpus of a single run is small (tens to hundreds of chunks),
//! so an exhaustive scan is both exact and fast enough.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexedRecord, RetrievedCandidate};
use crate::error::{RagError, Result};
use crate::similarity::cosine_similarity;
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// An in-memory vector store using cosine similarity for search.
///
/// Collections are stored as collection name → records in insertion order.
/// All operations are async-safe via `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<IndexedRecord>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection, or `None` if it does not exist.
    pub async fn len(&self, collection: &str) -> Option<usize> {
        self.collections.read().await.get(collection).map(Vec::len)
    }
}

fn missing(collection: &str) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("collection '{collection}' does not exist"),
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn insert(&self, collection: &str, records: &[IndexedRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing(collection))?;
        store.extend_from_slice(records);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedCandidate>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing(collection))?;

        let mut scored: Vec<RetrievedCandidate> = store
            .iter()
            .map(|record| RetrievedCandidate {
                text: record.text.clone(),
                source: record.source.clone(),
                raw_similarity: cosine_similarity(&record.vector, embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| {
            b.raw_similarity.partial_cmp(&a.raw_similarity).unwrap_or(Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}
