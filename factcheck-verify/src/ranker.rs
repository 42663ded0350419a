//! Evidence reranking against the literal claim.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use factcheck_rag::{EvidenceItem, RerankHit, Reranker, RetrievedCandidate};
use tracing::{debug, warn};

use crate::error::{Stage, StageError, with_deadline};

/// Map reranker hits back onto the candidates they index.
///
/// Hits pointing outside `candidates`, or at a candidate already taken, are
/// dropped. At most `top_n` items are returned, in hit order.
pub fn project_hits(
    candidates: &[RetrievedCandidate],
    hits: &[RerankHit],
    top_n: usize,
) -> Vec<EvidenceItem> {
    let mut seen = HashSet::new();
    let mut evidence = Vec::with_capacity(top_n.min(hits.len()));

    for hit in hits {
        if evidence.len() == top_n {
            break;
        }
        let Some(candidate) = candidates.get(hit.index) else {
            warn!(
                index = hit.index,
                candidates = candidates.len(),
                "reranker returned out-of-range index"
            );
            continue;
        };
        if !seen.insert(hit.index) {
            warn!(index = hit.index, "reranker returned duplicate index");
            continue;
        }
        evidence.push(EvidenceItem::from(candidate));
    }
    evidence
}

/// Orders retrieved candidates by relevance to the claim itself.
///
/// The hypothetical passage used for retrieval is not consulted here.
pub struct EvidenceRanker {
    reranker: Arc<dyn Reranker>,
    call_timeout: Duration,
}

impl EvidenceRanker {
    /// Create a ranker over the given reranking service.
    pub fn new(reranker: Arc<dyn Reranker>, call_timeout: Duration) -> Self {
        Self { reranker, call_timeout }
    }

    /// Rerank `candidates` by relevance to `claim`, keeping at most `top_n`.
    pub async fn rerank(
        &self,
        claim: &str,
        candidates: &[RetrievedCandidate],
        top_n: usize,
    ) -> Result<Vec<EvidenceItem>, StageError> {
        let documents: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        let hits = with_deadline(
            Stage::Reranking,
            self.call_timeout,
            self.reranker.rerank(claim, &documents, top_n),
        )
        .await?;

        let evidence = project_hits(candidates, &hits, top_n);
        debug!(
            candidates = candidates.len(),
            hits = hits.len(),
            kept = evidence.len(),
            "reranking complete"
        );
        Ok(evidence)
    }
}

impl std::fmt::Debug for EvidenceRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceRanker")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}
