//! # factcheck-verify
//!
//! The claim side of fact checking: each claim is verified against a built
//! [`factcheck_rag::KnowledgeBase`] and yields one [`Verdict`].
//!
//! ## Overview
//!
//! - [`HydeRetriever`] generates a hypothetical passage for the claim, embeds
//!   it and searches the knowledge base
//! - [`EvidenceRanker`] reranks candidates against the literal claim
//! - [`ConfidenceScorer`] maps claim/evidence cosine similarity to `0..=100`
//! - [`Adjudicator`] asks a [`TextGenerator`] for a schema-constrained decision
//! - [`Verifier`] runs the four stages per claim and verifies batches with
//!   bounded concurrency
//! - [`split_sentences`] turns an article into claims
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use factcheck_verify::{OpenAIGenerator, Verifier, split_sentences};
//!
//! let verifier = Verifier::builder()
//!     .hyde_generator(Arc::new(OpenAIGenerator::from_env("gpt-4o-mini")?))
//!     .adjudication_generator(Arc::new(OpenAIGenerator::from_env("gpt-4o")?))
//!     .embedding_provider(kb.embedding_provider().clone())
//!     .build()?;
//!
//! for verdict in verifier.verify_all(&split_sentences(&article), &kb).await {
//!     println!("{}: {}", verdict.decision, verdict.claim);
//! }
//! ```
//!
//! ## Features
//!
//! - `openai` – OpenAI chat completions generator

pub mod adjudicator;
pub mod config;
pub mod error;
pub mod generation;
pub mod ranker;
pub mod retriever;
pub mod scorer;
pub mod sentences;
pub mod verdict;
pub mod verifier;

#[cfg(feature = "openai")]
pub mod openai;

pub use adjudicator::{Adjudication, Adjudicator, DEFAULT_REASON};
pub use config::{VerifierConfig, VerifierConfigBuilder};
pub use error::{Result, Stage, StageError, VerifyError};
pub use generation::{GenerationRequest, ResponseFormat, TextGenerator};
pub use ranker::EvidenceRanker;
pub use retriever::HydeRetriever;
pub use scorer::{ConfidenceScorer, similarity_to_score};
pub use sentences::split_sentences;
pub use verdict::{Decision, NO_DOCUMENTS_REASON, Verdict};
pub use verifier::{Verifier, VerifierBuilder};

#[cfg(feature = "openai")]
pub use openai::{DEFAULT_ADJUDICATION_MODEL, DEFAULT_HYDE_MODEL, OpenAIGenerator};
