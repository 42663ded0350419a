//! # factcheck-rag
//!
//! The evidence side of claim verification: turning reference pages into an
//! in-process vector index and ranking candidate evidence.
//!
//! ## Overview
//!
//! - [`WebTextExtractor`] fetches reference URLs and extracts body text
//! - [`FixedSizeChunker`] splits documents into overlapping character windows
//! - [`EmbeddingProvider`] turns text into vectors ([`OpenAIEmbeddingProvider`])
//! - [`KnowledgeBase`] embeds all chunks in one batch and serves nearest-neighbor
//!   search over a [`VectorStore`] ([`InMemoryVectorStore`])
//! - [`Reranker`] orders candidate texts by relevance to a query ([`CohereReranker`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use factcheck_rag::{
//!     Chunker, FixedSizeChunker, KnowledgeBase, OpenAIEmbeddingProvider, WebTextExtractor,
//! };
//!
//! let documents = WebTextExtractor::new()?.extract(&urls).await;
//! let chunks = FixedSizeChunker::new(500, 50).chunk_all(&documents);
//!
//! let kb = KnowledgeBase::in_memory(Arc::new(OpenAIEmbeddingProvider::from_env()?));
//! kb.build(&chunks).await?;
//! ```
//!
//! ## Features
//!
//! - `openai` – OpenAI embeddings client
//! - `cohere` – Cohere rerank client
//! - `web` – HTTP fetching and HTML-to-text extraction

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod knowledge_base;
pub mod reranker;
pub mod similarity;
pub mod vectorstore;

#[cfg(feature = "cohere")]
pub mod cohere;
#[cfg(feature = "web")]
pub mod extraction;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder, RetryPolicy};
pub use document::{EvidenceChunk, EvidenceItem, IndexedRecord, RetrievedCandidate, SourceDocument};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result, ServiceErrorKind};
pub use inmemory::InMemoryVectorStore;
pub use knowledge_base::{BuildError, DEFAULT_COLLECTION, KnowledgeBase};
pub use reranker::{NoOpReranker, RerankHit, Reranker};
pub use similarity::cosine_similarity;
pub use vectorstore::VectorStore;

#[cfg(feature = "cohere")]
pub use cohere::CohereReranker;
#[cfg(feature = "web")]
pub use extraction::{WebTextExtractor, html_to_text};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
