//! Error types for the `factcheck-verify` crate.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use factcheck_rag::{RagError, ServiceErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A step of the per-claim verification workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// HyDE expansion, embedding and vector search.
    Retrieval,
    /// Relevance reranking against the literal claim.
    Reranking,
    /// Claim/evidence similarity scoring.
    Scoring,
    /// LLM classification of the claim against the evidence.
    Adjudication,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Retrieval => "Retrieval",
            Self::Reranking => "Reranking",
            Self::Scoring => "Scoring",
            Self::Adjudication => "Adjudication",
        };
        f.write_str(name)
    }
}

/// A failure confined to one stage of one claim.
///
/// The orchestrator turns this into an `Error` verdict for that claim and
/// moves on; it never aborts a batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Error in {stage} stage: {message}")]
pub struct StageError {
    /// The stage that failed.
    pub stage: Stage,
    /// Structured category of the underlying service failure.
    pub kind: ServiceErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl StageError {
    /// Create a stage error.
    pub fn new(stage: Stage, kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self { stage, kind, message: message.into() }
    }

    /// A deadline expiry on an external call made by `stage`.
    pub fn timeout(stage: Stage, after: Duration) -> Self {
        Self::new(
            stage,
            ServiceErrorKind::Timeout,
            format!("external call exceeded deadline of {} ms", after.as_millis()),
        )
    }
}

/// Errors from generation clients and verifier setup.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The generation service call failed.
    #[error("Generation error ({model}, {kind}): {message}")]
    Generation {
        /// Model that was called.
        model: String,
        /// Structured failure category.
        kind: ServiceErrorKind,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error propagated from `factcheck-rag`.
    #[error(transparent)]
    Rag(#[from] RagError),
}

impl VerifyError {
    /// The structured failure category, when the error came from a service call.
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            Self::Generation { kind, .. } => *kind,
            Self::Rag(e) => e.kind(),
            Self::Config(_) => ServiceErrorKind::Unknown,
        }
    }
}

/// A convenience result type for verifier operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Errors that carry a [`ServiceErrorKind`].
pub(crate) trait Classified: fmt::Display {
    fn service_kind(&self) -> ServiceErrorKind;
}

impl Classified for RagError {
    fn service_kind(&self) -> ServiceErrorKind {
        self.kind()
    }
}

impl Classified for VerifyError {
    fn service_kind(&self) -> ServiceErrorKind {
        self.kind()
    }
}

/// Await an external call under a deadline, attributing any failure to `stage`.
pub(crate) async fn with_deadline<T, E, F>(
    stage: Stage,
    deadline: Duration,
    call: F,
) -> std::result::Result<T, StageError>
where
    E: Classified,
    F: Future<Output = std::result::Result<T, E>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(StageError::new(stage, e.service_kind(), e.to_string())),
        Err(_) => Err(StageError::timeout(stage, deadline)),
    }
}
