//! Shared fakes for verifier tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use factcheck_rag::{
    EmbeddingProvider, EvidenceChunk, KnowledgeBase, RagError, RerankHit, Reranker,
    ServiceErrorKind,
};
use factcheck_verify::{GenerationRequest, ResponseFormat, TextGenerator, VerifyError};

pub const DIM: usize = 64;

/// Score at or above which [`threshold_judge`] answers `Supported`.
pub const SUPPORT_THRESHOLD: u8 = 70;

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 3)
}

/// Signed bag-of-words hashing into `DIM` buckets.
pub fn embed_words(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    for word in words(text) {
        let h = fnv1a(&word);
        let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
        v[((h >> 1) % DIM as u64) as usize] += sign;
    }
    v
}

/// Deterministic embedder with call counters. Optionally fails batch calls.
#[derive(Default)]
pub struct HashingEmbedder {
    pub embed_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub fail_batches: bool,
}

impl HashingEmbedder {
    pub fn failing_batches() -> Self {
        Self { fail_batches: true, ..Self::default() }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> factcheck_rag::Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(embed_words(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> factcheck_rag::Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_batches {
            let kind = ServiceErrorKind::Unknown;
            return Err(RagError::embedding("Hashing", kind, "injected failure"));
        }
        Ok(texts.iter().map(|t| embed_words(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Hashing embedder that records every single-text `embed` input.
#[derive(Default)]
pub struct RecordingEmbedder {
    inner: HashingEmbedder,
    pub embedded: Mutex<Vec<String>>,
}

impl RecordingEmbedder {
    pub fn embedded(&self) -> Vec<String> {
        self.embedded.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    async fn embed(&self, text: &str) -> factcheck_rag::Result<Vec<f32>> {
        self.embedded.lock().unwrap().push(text.to_string());
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> factcheck_rag::Result<Vec<Vec<f32>>> {
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

type Respond = dyn Fn(&GenerationRequest) -> factcheck_verify::Result<String> + Send + Sync;

/// Generator whose answers come from a closure.
pub struct ScriptedGenerator {
    respond: Box<Respond>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&GenerationRequest) -> factcheck_verify::Result<String> + Send + Sync + 'static,
    {
        Self { respond: Box::new(respond), calls: AtomicUsize::new(0) }
    }

    /// HyDE fake: the "hypothetical passage" is the claim itself.
    pub fn echo() -> Self {
        Self::new(|request| Ok(claim_from_prompt(&request.prompt).to_string()))
    }

    /// Adjudication fake driven by the similarity score in the prompt.
    pub fn judge() -> Self {
        Self::new(threshold_judge)
    }

    pub fn failing(kind: ServiceErrorKind) -> Self {
        Self::new(move |_| Err(generation_failure(kind, "injected failure")))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> factcheck_verify::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(&request)
    }
}

pub fn generation_failure(kind: ServiceErrorKind, message: &str) -> VerifyError {
    VerifyError::Generation { model: "scripted".into(), kind, message: message.into() }
}

/// The quoted claim at the end of a HyDE prompt, or the whole prompt.
pub fn claim_from_prompt(prompt: &str) -> &str {
    prompt
        .rsplit_once("Statement: \"")
        .map(|(_, rest)| rest.trim_end_matches('"'))
        .unwrap_or(prompt)
}

/// The `N/100` score embedded in an adjudication prompt.
pub fn score_from_prompt(prompt: &str) -> Option<u8> {
    let (before, _) = prompt.split_once("/100")?;
    before.rsplit(' ').next()?.parse().ok()
}

/// Answers `Supported` when the prompt's score reaches [`SUPPORT_THRESHOLD`].
pub fn threshold_judge(request: &GenerationRequest) -> factcheck_verify::Result<String> {
    assert!(matches!(request.response_format, ResponseFormat::JsonSchema { .. }));
    let score = score_from_prompt(&request.prompt).unwrap_or(0);
    let decision =
        if score >= SUPPORT_THRESHOLD { "Supported" } else { "Not Enough Information" };
    Ok(serde_json::json!({ "decision": decision, "reason": format!("score {score}") }).to_string())
}

/// Generator that never answers within any reasonable deadline.
pub struct StallingGenerator;

#[async_trait]
impl TextGenerator for StallingGenerator {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn generate(&self, _request: GenerationRequest) -> factcheck_verify::Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }
}

/// Echo generator that records how many calls overlap.
#[derive(Default)]
pub struct SlowEchoGenerator {
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

#[async_trait]
impl TextGenerator for SlowEchoGenerator {
    fn name(&self) -> &str {
        "slow-echo"
    }

    async fn generate(&self, request: GenerationRequest) -> factcheck_verify::Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(1)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(claim_from_prompt(&request.prompt).to_string())
    }
}

/// Ranks documents by the number of query words they share; ties keep input order.
#[derive(Default)]
pub struct KeywordReranker {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Reranker for KeywordReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[&str],
        top_n: usize,
    ) -> factcheck_rag::Result<Vec<RerankHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let query_words: Vec<String> = words(query).collect();
        let mut hits: Vec<RerankHit> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| RerankHit {
                index,
                relevance_score: words(doc).filter(|w| query_words.contains(w)).count() as f32,
            })
            .collect();
        hits.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        hits.truncate(top_n);
        Ok(hits)
    }
}

/// Keyword reranker that records every query it is given.
#[derive(Default)]
pub struct RecordingReranker {
    inner: KeywordReranker,
    pub queries: Mutex<Vec<String>>,
}

impl RecordingReranker {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reranker for RecordingReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[&str],
        top_n: usize,
    ) -> factcheck_rag::Result<Vec<RerankHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        self.inner.rerank(query, documents, top_n).await
    }
}

/// Reranker that returns a fixed list of indices, valid or not.
pub struct FixedReranker(pub Vec<usize>);

#[async_trait]
impl Reranker for FixedReranker {
    async fn rerank(
        &self,
        _query: &str,
        _documents: &[&str],
        _top_n: usize,
    ) -> factcheck_rag::Result<Vec<RerankHit>> {
        Ok(self.0.iter().map(|&index| RerankHit { index, relevance_score: 1.0 }).collect())
    }
}

pub struct FailingReranker;

#[async_trait]
impl Reranker for FailingReranker {
    async fn rerank(
        &self,
        _query: &str,
        _documents: &[&str],
        _top_n: usize,
    ) -> factcheck_rag::Result<Vec<RerankHit>> {
        Err(RagError::reranker("Failing", ServiceErrorKind::RateLimited, "too many requests"))
    }
}

pub const S1_TEXT: &str = "Large language models are trained on text scraped from the internet.";

/// Machine-learning corpus whose first chunk is the `S1` evidence.
pub fn ml_corpus() -> Vec<EvidenceChunk> {
    vec![
        EvidenceChunk::new("S1", S1_TEXT),
        EvidenceChunk::new("S2", "Reinforcement learning agents maximise cumulative reward."),
        EvidenceChunk::new("S3", "Retrieval augmented generation grounds answers in documents."),
        EvidenceChunk::new(
            "S4",
            "Gradient descent minimises a loss function over model parameters.",
        ),
    ]
}

/// A knowledge base built from `chunks` with its own hashing embedder.
pub async fn built_kb(chunks: &[EvidenceChunk]) -> KnowledgeBase {
    let kb = KnowledgeBase::in_memory(Arc::new(HashingEmbedder::default()));
    kb.build(chunks).await.unwrap();
    kb
}
