//! Hypothetical-document (HyDE) retrieval.

use std::sync::Arc;
use std::time::Duration;

use factcheck_rag::{EmbeddingProvider, KnowledgeBase, RetrievedCandidate};
use tracing::debug;

use crate::error::{Stage, StageError, with_deadline};
use crate::generation::{GenerationRequest, TextGenerator};

/// Build the prompt asking for a passage that elaborates on `claim`.
pub fn hyde_prompt(claim: &str) -> String {
    format!(
        "Write a detailed, encyclopedia-style passage that explains and contextualizes the \
         following statement. The passage does not need to be factually accurate; its purpose \
         is to describe the statement's topic as richly as possible. Write in the same language \
         as the statement.\n\nStatement: \"{claim}\""
    )
}

/// Retrieves evidence candidates by embedding a generated passage instead of
/// the raw claim.
///
/// Short claims embed poorly against longer prose; a hypothetical passage about
/// the same topic lands closer to real evidence in vector space.
pub struct HydeRetriever {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn EmbeddingProvider>,
    call_timeout: Duration,
}

impl HydeRetriever {
    /// Create a retriever. `embedder` must be the one the knowledge base was built with.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn EmbeddingProvider>,
        call_timeout: Duration,
    ) -> Self {
        Self { generator, embedder, call_timeout }
    }

    /// Return up to `top_k` candidates for `claim`, nearest first.
    ///
    /// An empty result is not an error; it means the knowledge base holds
    /// nothing relevant (or nothing at all).
    pub async fn retrieve(
        &self,
        claim: &str,
        kb: &KnowledgeBase,
        top_k: usize,
    ) -> Result<Vec<RetrievedCandidate>, StageError> {
        let passage = with_deadline(
            Stage::Retrieval,
            self.call_timeout,
            self.generator.generate(GenerationRequest::text(hyde_prompt(claim))),
        )
        .await?;
        debug!(
            generator = self.generator.name(),
            passage_len = passage.len(),
            "hypothetical passage generated"
        );

        let query_vector =
            with_deadline(Stage::Retrieval, self.call_timeout, self.embedder.embed(&passage))
                .await?;

        let candidates = kb.search(&query_vector, top_k).await;
        debug!(candidates = candidates.len(), top_k, "retrieval complete");
        Ok(candidates)
    }
}

impl std::fmt::Debug for HydeRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydeRetriever")
            .field("generator", &self.generator.name())
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}
