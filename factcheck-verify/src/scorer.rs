//! Quantitative claim/evidence similarity score.

use std::sync::Arc;
use std::time::Duration;

use factcheck_rag::{EmbeddingProvider, ServiceErrorKind, cosine_similarity};
use tracing::debug;

use crate::error::{Stage, StageError, with_deadline};

/// Map a cosine similarity in `[-1, 1]` to an integer score in `[0, 100]`.
///
/// Out-of-range inputs are clamped and NaN is treated as 0.
pub fn similarity_to_score(cosine: f32) -> u8 {
    let cosine = if cosine.is_nan() { 0.0 } else { cosine.clamp(-1.0, 1.0) };
    ((cosine + 1.0) / 2.0 * 100.0).round() as u8
}

/// Scores how semantically close the top evidence is to the claim.
///
/// The score measures topical overlap only; a negated claim can score high.
pub struct ConfidenceScorer {
    embedder: Arc<dyn EmbeddingProvider>,
    call_timeout: Duration,
}

impl ConfidenceScorer {
    /// Create a scorer.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, call_timeout: Duration) -> Self {
        Self { embedder, call_timeout }
    }

    /// Embed `claim` and `top_evidence_text` and return their similarity score.
    pub async fn score(&self, claim: &str, top_evidence_text: &str) -> Result<u8, StageError> {
        let vectors = with_deadline(
            Stage::Scoring,
            self.call_timeout,
            self.embedder.embed_batch(&[claim, top_evidence_text]),
        )
        .await?;

        let [claim_vector, evidence_vector] = vectors.as_slice() else {
            return Err(StageError::new(
                Stage::Scoring,
                ServiceErrorKind::Unknown,
                format!("expected 2 embeddings, got {}", vectors.len()),
            ));
        };

        let cosine = cosine_similarity(claim_vector, evidence_vector);
        let score = similarity_to_score(cosine);
        debug!(cosine, score, "similarity scored");
        Ok(score)
    }
}

impl std::fmt::Debug for ConfidenceScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfidenceScorer")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}
