//! Cohere reranker using the Cohere rerank API.
//!
//! This module is only available when the `cohere` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result, ServiceErrorKind};
use crate::reranker::{RerankHit, Reranker};

const COHERE_API_BASE: &str = "https://api.cohere.com/v2";

/// Multilingual so that non-English articles rank against non-English sources.
const DEFAULT_MODEL: &str = "rerank-multilingual-v3.0";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const RERANKER: &str = "Cohere";

/// A [`Reranker`] backed by the Cohere `/rerank` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use factcheck_rag::cohere::CohereReranker;
///
/// let reranker = CohereReranker::from_env()?;
/// let hits = reranker.rerank("LLMs are trained on internet text.", &texts, 3).await?;
/// ```
pub struct CohereReranker {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl CohereReranker {
    /// Create a new reranker with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::reranker(
                RERANKER,
                ServiceErrorKind::Unauthorized,
                "API key must not be empty",
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: COHERE_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Create a new reranker using the `COHERE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY").map_err(|_| {
            RagError::reranker(
                RERANKER,
                ServiceErrorKind::Unauthorized,
                "COHERE_API_KEY environment variable not set",
            )
        })?;
        Self::new(api_key)
    }

    /// Set the rerank model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the reranker at a different API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [&'a str],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

fn api_error(status: u16, body: &str) -> RagError {
    let detail =
        serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| body.into());
    RagError::reranker(
        RERANKER,
        ServiceErrorKind::from_http(status, None),
        format!("API returned {status}: {detail}"),
    )
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[&str],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        if documents.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        debug!(
            reranker = RERANKER,
            documents = documents.len(),
            top_n,
            model = %self.model,
            "reranking"
        );

        let request_body = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n: top_n.min(documents.len()),
        };

        let response = self
            .client
            .post(format!("{}/rerank", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(reranker = RERANKER, error = %e, "request failed");
                RagError::reranker(
                    RERANKER,
                    ServiceErrorKind::from_reqwest(&e),
                    format!("request failed: {e}"),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(reranker = RERANKER, %status, "API error");
            return Err(api_error(status.as_u16(), &body));
        }

        let parsed: RerankResponse = response.json().await.map_err(|e| {
            error!(reranker = RERANKER, error = %e, "failed to parse response");
            RagError::reranker(
                RERANKER,
                ServiceErrorKind::Unknown,
                format!("failed to parse response: {e}"),
            )
        })?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| RerankHit { index: r.index, relevance_score: r.relevance_score })
            .collect())
    }
}
