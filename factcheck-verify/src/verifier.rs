//! The per-claim verification workflow and batch driver.

use std::sync::Arc;

use factcheck_rag::{EmbeddingProvider, KnowledgeBase, NoOpReranker, Reranker};
use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::adjudicator::{Adjudication, Adjudicator};
use crate::config::VerifierConfig;
use crate::error::{Result, StageError, VerifyError};
use crate::generation::TextGenerator;
use crate::ranker::EvidenceRanker;
use crate::retriever::HydeRetriever;
use crate::scorer::ConfidenceScorer;
use crate::verdict::{NO_DOCUMENTS_REASON, Verdict};

const NO_RANKED_EVIDENCE_REASON: &str = "Reranking returned no usable evidence.";

/// Verifies claims against a built [`KnowledgeBase`].
///
/// Each claim runs retrieval, reranking, scoring and adjudication in order.
/// Every claim yields exactly one [`Verdict`]: a failure in any stage becomes
/// an `Error` verdict naming that stage, and an empty retrieval becomes
/// `Not Enough Information`. Nothing is retried at this level.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use factcheck_verify::Verifier;
///
/// let verifier = Verifier::builder()
///     .hyde_generator(Arc::new(mini))
///     .adjudication_generator(Arc::new(judge))
///     .embedding_provider(kb.embedding_provider().clone())
///     .reranker(Arc::new(cohere))  // optional
///     .build()?;
///
/// let verdicts = verifier.verify_all(&sentences, &kb).await;
/// ```
pub struct Verifier {
    config: VerifierConfig,
    retriever: HydeRetriever,
    ranker: EvidenceRanker,
    scorer: ConfidenceScorer,
    adjudicator: Adjudicator,
}

impl Verifier {
    /// Create a new [`VerifierBuilder`].
    pub fn builder() -> VerifierBuilder {
        VerifierBuilder::default()
    }

    /// Returns the verifier configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify one claim.
    #[tracing::instrument(skip_all, fields(claim = %claim))]
    pub async fn verify(&self, claim: &str, kb: &KnowledgeBase) -> Verdict {
        match self.run_stages(claim, kb).await {
            Ok(verdict) => {
                info!(decision = %verdict.decision, score = verdict.score, "claim verified");
                verdict
            }
            Err(e) => {
                error!(
                    stage = %e.stage,
                    kind = %e.kind,
                    error = %e.message,
                    "claim verification failed"
                );
                Verdict::failed(claim, &e)
            }
        }
    }

    /// Verify many claims, at most `max_concurrency` at a time.
    ///
    /// Returns one verdict per claim, in input order.
    pub async fn verify_all<S: AsRef<str>>(
        &self,
        claims: &[S],
        kb: &KnowledgeBase,
    ) -> Vec<Verdict> {
        let max_concurrency = self.config.max_concurrency;
        info!(claims = claims.len(), max_concurrency, "verifying claims");
        stream::iter(claims)
            .map(|claim| self.verify(claim.as_ref(), kb))
            .buffered(max_concurrency)
            .collect()
            .await
    }

    async fn run_stages(
        &self,
        claim: &str,
        kb: &KnowledgeBase,
    ) -> std::result::Result<Verdict, StageError> {
        let candidates = self.retriever.retrieve(claim, kb, self.config.retrieval_top_k).await?;
        if candidates.is_empty() {
            return Ok(Verdict::not_enough_information(claim, NO_DOCUMENTS_REASON));
        }

        let evidence = self.ranker.rerank(claim, &candidates, self.config.rerank_top_n).await?;
        let Some(top) = evidence.first() else {
            return Ok(Verdict::not_enough_information(claim, NO_RANKED_EVIDENCE_REASON));
        };

        let score = self.scorer.score(claim, &top.text).await?;
        let Adjudication { decision, reason } =
            self.adjudicator.adjudicate(claim, &evidence, score).await?;

        Ok(Verdict { claim: claim.to_string(), score, decision, reason, evidence })
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("config", &self.config)
            .field("retriever", &self.retriever)
            .field("adjudicator", &self.adjudicator)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Verifier`].
///
/// Both generators and the embedding provider are required. The reranker
/// defaults to [`NoOpReranker`] and the configuration to
/// [`VerifierConfig::default`].
#[derive(Default)]
pub struct VerifierBuilder {
    config: Option<VerifierConfig>,
    hyde_generator: Option<Arc<dyn TextGenerator>>,
    adjudication_generator: Option<Arc<dyn TextGenerator>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl VerifierBuilder {
    /// Set the verifier configuration.
    pub fn config(mut self, config: VerifierConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use one generator for both HyDE expansion and adjudication.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.hyde_generator = Some(generator.clone());
        self.adjudication_generator = Some(generator);
        self
    }

    /// Set the generator that writes hypothetical passages.
    pub fn hyde_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.hyde_generator = Some(generator);
        self
    }

    /// Set the generator that adjudicates claims.
    pub fn adjudication_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.adjudication_generator = Some(generator);
        self
    }

    /// Set the embedding provider. It must be the one the knowledge base was built with.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the relevance reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`Verifier`].
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Config`] if a required field is missing or the
    /// configuration has a zero count or timeout.
    pub fn build(self) -> Result<Verifier> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let hyde_generator = self
            .hyde_generator
            .ok_or_else(|| VerifyError::Config("hyde_generator is required".to_string()))?;
        let adjudication_generator = self
            .adjudication_generator
            .ok_or_else(|| VerifyError::Config("adjudication_generator is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| VerifyError::Config("embedding_provider is required".to_string()))?;
        let reranker = self.reranker.unwrap_or_else(|| Arc::new(NoOpReranker));

        let timeout = config.call_timeout;
        Ok(Verifier {
            retriever: HydeRetriever::new(hyde_generator, embedding_provider.clone(), timeout),
            ranker: EvidenceRanker::new(reranker, timeout),
            scorer: ConfidenceScorer::new(embedding_provider, timeout),
            adjudicator: Adjudicator::new(adjudication_generator, timeout),
            config,
        })
    }
}
