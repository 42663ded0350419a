//! The per-run evidence index.
//!
//! [`KnowledgeBase`] embeds every evidence chunk in one batched call and
//! loads the resulting records into a [`VectorStore`] collection. The index
//! is either unbuilt or fully built: a build holds the state lock for its
//! whole duration, and a failed build leaves the index unbuilt.
//!
//! # Example
//!
//! ```rust,ignore
//! use factcheck_rag::{EvidenceChunk, KnowledgeBase};
//!
//! let kb = KnowledgeBase::in_memory(Arc::new(embedder));
//! kb.build(&chunks).await?;
//! let hits = kb.search(&query_vector, 10).await;
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::RetryPolicy;
use crate::document::{EvidenceChunk, IndexedRecord, RetrievedCandidate};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, ServiceErrorKind};
use crate::inmemory::InMemoryVectorStore;
use crate::vectorstore::VectorStore;

/// Name of the collection holding the evidence records.
pub const DEFAULT_COLLECTION: &str = "fact_checker_kb";

/// Why a [`KnowledgeBase::build`] failed.
///
/// Without a usable index no claim can be verified, so callers treat this
/// as fatal for the run and surface [`hint`](BuildError::hint) to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The embedding service throttled the batch request.
    #[error("embedding service rate limit reached: {message}")]
    RateLimited {
        /// Underlying error message.
        message: String,
    },
    /// The embedding service rejected the credentials.
    #[error("embedding service rejected the credentials: {message}")]
    Unauthorized {
        /// Underlying error message.
        message: String,
    },
    /// The embedding account is out of quota.
    #[error("embedding service quota exceeded: {message}")]
    QuotaExceeded {
        /// Underlying error message.
        message: String,
    },
    /// Any other failure, including network errors and timeouts.
    #[error("failed to build knowledge base: {message}")]
    Unknown {
        /// Underlying error message.
        message: String,
    },
}

impl BuildError {
    /// A short remediation hint pointing at the likely cause.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => {
                "The embedding API rate limit was hit. Wait a moment and retry, or lower request volume."
            }
            Self::Unauthorized { .. } => {
                "Authentication failed. Check that OPENAI_API_KEY is set correctly."
            }
            Self::QuotaExceeded { .. } => {
                "The embedding API quota is exhausted. Check the account's billing plan and usage limits."
            }
            Self::Unknown { .. } => {
                "Check network connectivity and API availability, then retry."
            }
        }
    }

    /// The underlying error message.
    pub fn message(&self) -> &str {
        match self {
            Self::RateLimited { message }
            | Self::Unauthorized { message }
            | Self::QuotaExceeded { message }
            | Self::Unknown { message } => message,
        }
    }
}

impl From<RagError> for BuildError {
    fn from(err: RagError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ServiceErrorKind::RateLimited => Self::RateLimited { message },
            ServiceErrorKind::Unauthorized => Self::Unauthorized { message },
            ServiceErrorKind::QuotaExceeded => Self::QuotaExceeded { message },
            ServiceErrorKind::Timeout | ServiceErrorKind::Unknown => Self::Unknown { message },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexState {
    Unbuilt,
    Built { records: usize },
}

/// An evidence index built once per run and then searched read-only.
///
/// Searching is total: an unbuilt index or a backend failure yields an
/// empty result rather than an error.
pub struct KnowledgeBase {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    retry: RetryPolicy,
    state: RwLock<IndexState>,
}

impl KnowledgeBase {
    /// Create an unbuilt knowledge base over the given embedder and store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            collection: DEFAULT_COLLECTION.to_string(),
            retry: RetryPolicy::default(),
            state: RwLock::new(IndexState::Unbuilt),
        }
    }

    /// Create an unbuilt knowledge base backed by an [`InMemoryVectorStore`].
    pub fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(embedder, Arc::new(InMemoryVectorStore::new()))
    }

    /// Use a different collection name in the vector store.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the retry policy for the batched embedding call.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Whether the last build completed successfully with at least one record.
    pub async fn is_built(&self) -> bool {
        matches!(*self.state.read().await, IndexState::Built { .. })
    }

    /// Number of indexed records; zero when unbuilt.
    pub async fn len(&self) -> usize {
        match *self.state.read().await {
            IndexState::Built { records } => records,
            IndexState::Unbuilt => 0,
        }
    }

    /// Whether the index holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Embed all chunks and replace the index with one record per chunk.
    ///
    /// Any previous index is discarded first. Empty input succeeds and
    /// leaves the knowledge base unbuilt.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] classified from the embedding failure. The
    /// knowledge base is left unbuilt.
    pub async fn build(&self, chunks: &[EvidenceChunk]) -> Result<(), BuildError> {
        let mut state = self.state.write().await;
        *state = IndexState::Unbuilt;
        if let Err(e) = self.store.delete_collection(&self.collection).await {
            warn!(collection = %self.collection, error = %e, "failed to drop previous index");
        }

        if chunks.is_empty() {
            info!("no chunks to build knowledge base from");
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        info!(chunk_count = texts.len(), "embedding chunks");

        let embeddings = self.embed_with_retry(&texts).await.map_err(|e| {
            error!(error = %e, "failed to build knowledge base");
            BuildError::from(e)
        })?;

        if embeddings.len() != chunks.len() {
            return Err(BuildError::Unknown {
                message: format!(
                    "embedding service returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }

        let records: Vec<IndexedRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexedRecord {
                vector,
                text: chunk.text.clone(),
                source: chunk.source.clone(),
            })
            .collect();

        let loaded = async {
            self.store.create_collection(&self.collection, self.embedder.dimensions()).await?;
            self.store.insert(&self.collection, &records).await
        }
        .await;

        if let Err(e) = loaded {
            error!(collection = %self.collection, error = %e, "failed to load index");
            let _ = self.store.delete_collection(&self.collection).await;
            return Err(BuildError::from(e));
        }

        *state = IndexState::Built { records: records.len() };
        info!(record_count = records.len(), "knowledge base built");
        Ok(())
    }

    /// Return the `top_k` records nearest to `query_vector`, most similar first.
    ///
    /// Never fails: an unbuilt index or a backend error yields an empty list.
    pub async fn search(&self, query_vector: &[f32], top_k: usize) -> Vec<RetrievedCandidate> {
        let state = self.state.read().await;
        if *state == IndexState::Unbuilt {
            debug!("knowledge base is not built yet");
            return Vec::new();
        }

        match self.store.search(&self.collection, query_vector, top_k).await {
            Ok(hits) => {
                debug!(hit_count = hits.len(), top_k, "vector search completed");
                hits
            }
            Err(e) => {
                warn!(error = %e, "error during search");
                Vec::new()
            }
        }
    }

    async fn embed_with_retry(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut attempt = 1;
        loop {
            match self.embedder.embed_batch(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e)
                    if e.kind() == ServiceErrorKind::RateLimited
                        && attempt < self.retry.max_attempts =>
                {
                    let delay = self.retry.backoff_for(attempt);
                    let delay_ms = delay.as_millis() as u64;
                    warn!(attempt, delay_ms, "rate limited, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("collection", &self.collection)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
