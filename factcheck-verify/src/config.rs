//! Configuration for claim verification.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Parameters of the per-claim workflow and batch scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifierConfig {
    /// Number of candidates fetched from the knowledge base per claim.
    pub retrieval_top_k: usize,
    /// Number of evidence items kept after reranking.
    pub rerank_top_n: usize,
    /// Maximum number of claims verified at once.
    pub max_concurrency: usize,
    /// Deadline applied to each external service call.
    pub call_timeout: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            retrieval_top_k: 10,
            rerank_top_n: 3,
            max_concurrency: 4,
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl VerifierConfig {
    /// Create a new builder for constructing a [`VerifierConfig`].
    pub fn builder() -> VerifierConfigBuilder {
        VerifierConfigBuilder::default()
    }

    /// Check that every count and the timeout are non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval_top_k == 0 {
            return Err(VerifyError::Config("retrieval_top_k must be greater than zero".into()));
        }
        if self.rerank_top_n == 0 {
            return Err(VerifyError::Config("rerank_top_n must be greater than zero".into()));
        }
        if self.max_concurrency == 0 {
            return Err(VerifyError::Config("max_concurrency must be greater than zero".into()));
        }
        if self.call_timeout.is_zero() {
            return Err(VerifyError::Config("call_timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`VerifierConfig`].
#[derive(Debug, Clone, Default)]
pub struct VerifierConfigBuilder {
    config: VerifierConfig,
}

impl VerifierConfigBuilder {
    /// Set the number of candidates fetched per claim.
    pub fn retrieval_top_k(mut self, k: usize) -> Self {
        self.config.retrieval_top_k = k;
        self
    }

    /// Set the number of evidence items kept after reranking.
    pub fn rerank_top_n(mut self, n: usize) -> Self {
        self.config.rerank_top_n = n;
        self
    }

    /// Set how many claims may be in flight at once.
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.config.max_concurrency = n;
        self
    }

    /// Set the per-call deadline.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    /// Build the [`VerifierConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Config`] if any count is zero or the timeout is zero.
    pub fn build(self) -> Result<VerifierConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
