mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{
    FailingReranker, FixedReranker, HashingEmbedder, KeywordReranker, RecordingEmbedder,
    RecordingReranker, S1_TEXT, ScriptedGenerator,
    SlowEchoGenerator, StallingGenerator, built_kb, embed_words, generation_failure, ml_corpus,
    threshold_judge,
};
use factcheck_rag::{EvidenceChunk, KnowledgeBase, RetrievedCandidate, ServiceErrorKind};
use factcheck_verify::{
    Decision, EvidenceRanker, HydeRetriever, NO_DOCUMENTS_REASON, Stage, Verifier, VerifierConfig,
    VerifyError,
};
use proptest::prelude::*;

const SUPPORTED_CLAIM: &str = "LLMs are trained on internet text.";
const UNRELATED_CLAIM: &str = "The sky is green on Tuesdays.";

struct Harness {
    hyde: Arc<ScriptedGenerator>,
    judge: Arc<ScriptedGenerator>,
    embedder: Arc<HashingEmbedder>,
    reranker: Arc<KeywordReranker>,
}

impl Harness {
    fn new() -> Self {
        Self {
            hyde: Arc::new(ScriptedGenerator::echo()),
            judge: Arc::new(ScriptedGenerator::judge()),
            embedder: Arc::new(HashingEmbedder::default()),
            reranker: Arc::new(KeywordReranker::default()),
        }
    }

    fn verifier(&self) -> Verifier {
        Verifier::builder()
            .hyde_generator(self.hyde.clone())
            .adjudication_generator(self.judge.clone())
            .embedding_provider(self.embedder.clone())
            .reranker(self.reranker.clone())
            .build()
            .unwrap()
    }
}

#[tokio::test]
async fn supported_claim_end_to_end() {
    let kb = built_kb(&[EvidenceChunk::new("S1", S1_TEXT)]).await;
    let verdict = Harness::new().verifier().verify(SUPPORTED_CLAIM, &kb).await;

    assert_eq!(verdict.decision, Decision::Supported);
    assert!(verdict.score > 65, "score was {}", verdict.score);
    assert_eq!(verdict.evidence[0].source, "S1");
    assert_eq!(verdict.claim, SUPPORTED_CLAIM);
}

#[tokio::test]
async fn unrelated_claim_is_not_supported() {
    let kb = built_kb(&ml_corpus()).await;
    let verifier = Harness::new().verifier();

    let unrelated = verifier.verify(UNRELATED_CLAIM, &kb).await;
    let supported = verifier.verify(SUPPORTED_CLAIM, &kb).await;

    assert!(matches!(unrelated.decision, Decision::Refuted | Decision::NotEnoughInformation));
    assert!(unrelated.score < supported.score);
    assert!(unrelated.score < common::SUPPORT_THRESHOLD);
    assert_eq!(unrelated.evidence.len(), 3);
}

#[tokio::test]
async fn empty_knowledge_base_short_circuits() {
    let kb = KnowledgeBase::in_memory(Arc::new(HashingEmbedder::default()));
    kb.build(&[]).await.unwrap();
    let harness = Harness::new();

    let verdict = harness.verifier().verify(SUPPORTED_CLAIM, &kb).await;

    assert_eq!(verdict.decision, Decision::NotEnoughInformation);
    assert_eq!(verdict.reason, NO_DOCUMENTS_REASON);
    assert_eq!(verdict.score, 0);
    assert!(verdict.evidence.is_empty());
    assert_eq!(harness.hyde.call_count(), 1);
    assert_eq!(harness.reranker.calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.embedder.batch_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.judge.call_count(), 0);
}

#[tokio::test]
async fn retrieval_failure_names_the_stage() {
    let kb = built_kb(&ml_corpus()).await;
    let verifier = Verifier::builder()
        .hyde_generator(Arc::new(ScriptedGenerator::failing(ServiceErrorKind::RateLimited)))
        .adjudication_generator(Arc::new(ScriptedGenerator::judge()))
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .build()
        .unwrap();

    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;
    assert_eq!(verdict.decision, Decision::Error);
    assert!(verdict.reason.starts_with("Error in Retrieval stage:"), "{}", verdict.reason);
    assert_eq!(verdict.score, 0);
    assert!(verdict.evidence.is_empty());
}

#[tokio::test]
async fn reranking_failure_names_the_stage() {
    let kb = built_kb(&ml_corpus()).await;
    let harness = Harness::new();
    let verifier = Verifier::builder()
        .hyde_generator(harness.hyde.clone())
        .adjudication_generator(harness.judge.clone())
        .embedding_provider(harness.embedder.clone())
        .reranker(Arc::new(FailingReranker))
        .build()
        .unwrap();

    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;
    assert_eq!(verdict.decision, Decision::Error);
    assert!(verdict.reason.starts_with("Error in Reranking stage:"));
    assert_eq!(harness.judge.call_count(), 0);
}

#[tokio::test]
async fn scoring_failure_names_the_stage() {
    let kb = built_kb(&ml_corpus()).await;
    let verifier = Verifier::builder()
        .generator(Arc::new(ScriptedGenerator::new(|request| {
            if request.prompt.contains("Statement:") {
                Ok(common::claim_from_prompt(&request.prompt).to_string())
            } else {
                threshold_judge(request)
            }
        })))
        .embedding_provider(Arc::new(HashingEmbedder::failing_batches()))
        .build()
        .unwrap();

    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;
    assert_eq!(verdict.decision, Decision::Error);
    assert!(verdict.reason.starts_with("Error in Scoring stage:"));
}

#[tokio::test]
async fn adjudication_failure_names_the_stage() {
    let kb = built_kb(&ml_corpus()).await;
    let verifier = Verifier::builder()
        .hyde_generator(Arc::new(ScriptedGenerator::echo()))
        .adjudication_generator(Arc::new(ScriptedGenerator::failing(
            ServiceErrorKind::QuotaExceeded,
        )))
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .build()
        .unwrap();

    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;
    assert_eq!(verdict.decision, Decision::Error);
    assert!(verdict.reason.starts_with("Error in Adjudication stage:"));
    assert_eq!(verdict.score, 0);
}

#[tokio::test]
async fn malformed_adjudication_keeps_score_and_evidence() {
    let kb = built_kb(&[EvidenceChunk::new("S1", S1_TEXT)]).await;
    let verifier = Verifier::builder()
        .hyde_generator(Arc::new(ScriptedGenerator::echo()))
        .adjudication_generator(Arc::new(ScriptedGenerator::new(|_| Ok("I think so.".into()))))
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .build()
        .unwrap();

    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;
    assert_eq!(verdict.decision, Decision::Error);
    assert!(verdict.score > 50);
    assert_eq!(verdict.evidence.len(), 1);
}

#[tokio::test]
async fn failed_claim_does_not_stop_the_batch() {
    let kb = built_kb(&[EvidenceChunk::new("S1", S1_TEXT)]).await;
    let verifier = Verifier::builder()
        .hyde_generator(Arc::new(ScriptedGenerator::echo()))
        .adjudication_generator(Arc::new(ScriptedGenerator::new(|request| {
            if request.prompt.contains("poison") {
                Err(generation_failure(ServiceErrorKind::Unknown, "server error"))
            } else {
                threshold_judge(request)
            }
        })))
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .reranker(Arc::new(KeywordReranker::default()))
        .build()
        .unwrap();

    let claims = [SUPPORTED_CLAIM, "A poison claim about language models.", SUPPORTED_CLAIM];
    let verdicts = verifier.verify_all(&claims[..], &kb).await;

    let decisions: Vec<Decision> = verdicts.iter().map(|v| v.decision).collect();
    assert_eq!(decisions, [Decision::Supported, Decision::Error, Decision::Supported]);
    assert!(verdicts[1].reason.starts_with("Error in Adjudication stage:"));
    let order: Vec<&str> = verdicts.iter().map(|v| v.claim.as_str()).collect();
    assert_eq!(order, claims);
}

#[tokio::test(start_paused = true)]
async fn stalled_calls_time_out() {
    let kb = built_kb(&ml_corpus()).await;
    let retriever = HydeRetriever::new(
        Arc::new(StallingGenerator),
        Arc::new(HashingEmbedder::default()),
        Duration::from_secs(5),
    );

    let err = retriever.retrieve(SUPPORTED_CLAIM, &kb, 10).await.unwrap_err();
    assert_eq!(err.stage, Stage::Retrieval);
    assert_eq!(err.kind, ServiceErrorKind::Timeout);

    let verifier = Verifier::builder()
        .generator(Arc::new(StallingGenerator))
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .build()
        .unwrap();
    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;
    assert_eq!(verdict.decision, Decision::Error);
    assert!(verdict.reason.contains("deadline"));
}

#[tokio::test(start_paused = true)]
async fn batch_concurrency_is_bounded() {
    let kb = built_kb(&[EvidenceChunk::new("S1", S1_TEXT)]).await;
    let hyde = Arc::new(SlowEchoGenerator::default());
    let verifier = Verifier::builder()
        .config(VerifierConfig::builder().max_concurrency(2).build().unwrap())
        .hyde_generator(hyde.clone())
        .adjudication_generator(Arc::new(ScriptedGenerator::judge()))
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .build()
        .unwrap();

    let claims = vec![SUPPORTED_CLAIM.to_string(); 5];
    let verdicts = verifier.verify_all(&claims[..], &kb).await;

    assert_eq!(verdicts.len(), 5);
    assert!(verdicts.iter().all(|v| v.decision == Decision::Supported));
    assert_eq!(hyde.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rerank_with_no_surviving_evidence_is_not_enough_information() {
    let kb = built_kb(&ml_corpus()).await;
    let verifier = Verifier::builder()
        .generator(Arc::new(ScriptedGenerator::echo()))
        .embedding_provider(Arc::new(HashingEmbedder::default()))
        .reranker(Arc::new(FixedReranker(vec![99, 100])))
        .build()
        .unwrap();

    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;
    assert_eq!(verdict.decision, Decision::NotEnoughInformation);
    assert_eq!(verdict.score, 0);
}

#[test]
fn builder_requires_generators_and_embedder() {
    assert!(Verifier::builder().build().is_err());
    assert!(
        Verifier::builder()
            .generator(Arc::new(ScriptedGenerator::echo()))
            .build()
            .is_err()
    );
}

#[test]
fn builder_rejects_zero_counts_in_a_hand_built_config() {
    for config in [
        VerifierConfig { max_concurrency: 0, ..VerifierConfig::default() },
        VerifierConfig { rerank_top_n: 0, ..VerifierConfig::default() },
        VerifierConfig { retrieval_top_k: 0, ..VerifierConfig::default() },
        VerifierConfig { call_timeout: Duration::ZERO, ..VerifierConfig::default() },
    ] {
        let result = Verifier::builder()
            .config(config)
            .generator(Arc::new(ScriptedGenerator::echo()))
            .embedding_provider(Arc::new(HashingEmbedder::default()))
            .build();
        assert!(matches!(result, Err(VerifyError::Config(_))));
    }
}

#[tokio::test]
async fn hyde_embeds_the_passage_and_reranks_with_the_claim() {
    const PASSAGE: &str =
        "Large language models learn from enormous amounts of text scraped from the internet.";
    let kb = built_kb(&ml_corpus()).await;
    let embedder = Arc::new(RecordingEmbedder::default());
    let reranker = Arc::new(RecordingReranker::default());
    let verifier = Verifier::builder()
        .hyde_generator(Arc::new(ScriptedGenerator::new(|_| Ok(PASSAGE.to_string()))))
        .adjudication_generator(Arc::new(ScriptedGenerator::judge()))
        .embedding_provider(embedder.clone())
        .reranker(reranker.clone())
        .build()
        .unwrap();

    let verdict = verifier.verify(SUPPORTED_CLAIM, &kb).await;

    assert_ne!(verdict.decision, Decision::Error, "reason: {}", verdict.reason);
    assert_eq!(embedder.embedded(), vec![PASSAGE.to_string()]);
    assert_eq!(reranker.queries(), vec![SUPPORTED_CLAIM.to_string()]);
}

#[tokio::test]
async fn identical_text_scores_near_maximum() {
    let scorer = factcheck_verify::ConfidenceScorer::new(
        Arc::new(HashingEmbedder::default()),
        Duration::from_secs(1),
    );
    assert_eq!(scorer.score(S1_TEXT, S1_TEXT).await.unwrap(), 100);
}

fn candidates(n: usize) -> Vec<RetrievedCandidate> {
    (0..n)
        .map(|i| RetrievedCandidate {
            text: format!("candidate text {i}"),
            source: format!("S{i}"),
            raw_similarity: 0.0,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every evidence item matches some input candidate, with no repeats and
    /// no more than `top_n` items.
    #[test]
    fn rerank_never_invents_evidence(
        n in 0usize..8,
        indices in proptest::collection::vec(0usize..12, 0..12),
        top_n in 1usize..6,
    ) {
        let pool = candidates(n);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let evidence = rt.block_on(async {
            EvidenceRanker::new(Arc::new(FixedReranker(indices)), Duration::from_secs(1))
                .rerank(SUPPORTED_CLAIM, &pool, top_n)
                .await
                .unwrap()
        });

        prop_assert!(evidence.len() <= top_n);
        for item in &evidence {
            prop_assert!(pool.iter().any(|c| c.text == item.text && c.source == item.source));
        }
        let mut sources: Vec<&str> = evidence.iter().map(|e| e.source.as_str()).collect();
        sources.sort_unstable();
        sources.dedup();
        prop_assert_eq!(sources.len(), evidence.len());
    }

    /// Scores computed from embedded text stay within `0..=100`.
    #[test]
    fn scores_stay_in_range(
        claim in "[a-z]{4,8}( [a-z]{4,8}){0,6}",
        other in "[a-z]{4,8}( [a-z]{4,8}){0,6}",
    ) {
        let cos = factcheck_rag::cosine_similarity(&embed_words(&claim), &embed_words(&other));
        prop_assert!(factcheck_verify::similarity_to_score(cos) <= 100);
    }
}
