//! Error types for the `factcheck-rag` crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured failure category reported by an external service client.
///
/// Clients derive this from the HTTP status and the provider's
/// machine-readable error code, so callers can branch on the category
/// without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceErrorKind {
    /// The provider throttled the request (HTTP 429 without a quota code).
    RateLimited,
    /// Credentials were missing, invalid, or lacked permission.
    Unauthorized,
    /// The account has exhausted its quota or billing allowance.
    QuotaExceeded,
    /// The call did not complete before its deadline.
    Timeout,
    /// Anything else: network failures, 5xx responses, malformed payloads.
    Unknown,
}

impl ServiceErrorKind {
    /// Classify a failed HTTP response.
    ///
    /// `code` is the provider's error code from the response body, if any.
    /// A recognized code wins over the status, so a 429 carrying
    /// `insufficient_quota` is reported as [`QuotaExceeded`](Self::QuotaExceeded).
    pub fn from_http(status: u16, code: Option<&str>) -> Self {
        if let Some(kind) = code.and_then(Self::from_error_code) {
            return kind;
        }
        match status {
            401 | 403 => Self::Unauthorized,
            402 => Self::QuotaExceeded,
            408 | 504 => Self::Timeout,
            429 => Self::RateLimited,
            _ => Self::Unknown,
        }
    }

    /// Map a provider error code to a kind. Returns `None` for unrecognized codes.
    pub fn from_error_code(code: &str) -> Option<Self> {
        match code.trim_matches('"') {
            "insufficient_quota" | "billing_hard_limit_reached" => Some(Self::QuotaExceeded),
            "rate_limit_exceeded" | "rate_limit_error" => Some(Self::RateLimited),
            "invalid_api_key" | "invalid_authentication" | "unauthorized" => {
                Some(Self::Unauthorized)
            }
            _ => None,
        }
    }

    /// Classify a transport-level `reqwest` failure.
    #[cfg(any(feature = "openai", feature = "cohere", feature = "web"))]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if let Some(status) = error.status() {
            Self::from_http(status.as_u16(), None)
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RateLimited => "rate limited",
            Self::Unauthorized => "unauthorized",
            Self::QuotaExceeded => "quota exceeded",
            Self::Timeout => "timed out",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Errors that can occur in evidence-side operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}, {kind}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// Structured failure category.
        kind: ServiceErrorKind,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during relevance reranking.
    #[error("Reranker error ({reranker}, {kind}): {message}")]
    RerankerError {
        /// The reranker that produced the error.
        reranker: String,
        /// Structured failure category.
        kind: ServiceErrorKind,
        /// A description of the failure.
        message: String,
    },

    /// Fetching or cleaning a source document failed.
    #[error("Extraction error ({source_uri}): {message}")]
    ExtractionError {
        /// The URL that could not be extracted.
        source_uri: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    /// The structured failure category, when the error came from a service call.
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            Self::EmbeddingError { kind, .. } | Self::RerankerError { kind, .. } => *kind,
            _ => ServiceErrorKind::Unknown,
        }
    }

    /// Build an [`EmbeddingError`](Self::EmbeddingError).
    pub fn embedding(
        provider: &str,
        kind: ServiceErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::EmbeddingError { provider: provider.to_string(), kind, message: message.into() }
    }

    /// Build a [`RerankerError`](Self::RerankerError).
    pub fn reranker(
        reranker: &str,
        kind: ServiceErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::RerankerError { reranker: reranker.to_string(), kind, message: message.into() }
    }
}

/// A convenience result type for evidence-side operations.
pub type Result<T> = std::result::Result<T, RagError>;
