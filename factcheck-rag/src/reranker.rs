//! Reranker trait for relevance reordering of candidate texts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One entry of a reranking result: a position in the input list and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankHit {
    /// Index into the `documents` slice passed to [`Reranker::rerank`].
    pub index: usize,
    /// Relevance of that document to the query (higher is more relevant).
    pub relevance_score: f32,
}

/// A relevance reranking service.
///
/// Implementations can use hosted cross-encoders, local models, or simple
/// heuristics. Results refer back to the input by index; callers map them
/// onto their own records.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rank `documents` by relevance to `query`, returning at most `top_n` hits,
    /// most relevant first.
    async fn rerank(&self, query: &str, documents: &[&str], top_n: usize)
    -> Result<Vec<RerankHit>>;
}

/// A no-op reranker that keeps the input order.
///
/// Useful when no reranking service is configured: vector-search order is
/// passed through unchanged.
///
/// # Example
///
/// ```rust,ignore
/// use factcheck_rag::NoOpReranker;
///
/// let hits = NoOpReranker.rerank("query", &["a", "b"], 1).await?;
/// assert_eq!(hits[0].index, 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReranker;

#[async_trait]
impl Reranker for NoOpReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[&str],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        Ok((0..documents.len().min(top_n))
            .map(|index| RerankHit { index, relevance_score: 0.0 })
            .collect())
    }
}
