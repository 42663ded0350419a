//! Reference text extraction from web pages.
//!
//! This module is only available when the `web` feature is enabled.

use std::sync::LazyLock;
use std::time::Duration;

use html2text::render::text_renderer::TrivialDecorator;
use regex::Regex;
use tracing::{info, warn};

use crate::document::SourceDocument;
use crate::error::{RagError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Wide enough that html2text never wraps a paragraph.
const RENDER_WIDTH: usize = 100_000;

/// Page furniture removed before rendering: scripts, styling and navigation.
const STRIPPED_ELEMENTS: [&str; 7] =
    ["script", "style", "header", "footer", "nav", "aside", "form"];

static STRIP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STRIPPED_ELEMENTS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("unreachable error: element patterns are static")
        })
        .collect()
});

/// Convert an HTML page into plain text.
///
/// Non-content elements are dropped, the remainder is rendered without link
/// or emphasis decoration, and the result keeps one trimmed, non-empty line
/// per text block.
pub fn html_to_text(html: &str) -> String {
    let mut cleaned = html.to_string();
    for pattern in STRIP_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }

    let rendered = html2text::from_read_with_decorator(
        cleaned.as_bytes(),
        RENDER_WIDTH,
        TrivialDecorator::new(),
    );

    rendered.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n")
}

/// Fetches reference pages and extracts their body text.
///
/// # Example
///
/// ```rust,ignore
/// use factcheck_rag::WebTextExtractor;
///
/// let extractor = WebTextExtractor::new()?;
/// let documents = extractor.extract(&urls).await;
/// ```
#[derive(Debug, Clone)]
pub struct WebTextExtractor {
    client: reqwest::Client,
}

impl WebTextExtractor {
    /// Create an extractor with a browser-like User-Agent and a 15 second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create an extractor with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch one URL and extract its text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExtractionError`] on network failure or a non-success status.
    pub async fn fetch(&self, url: &str) -> Result<SourceDocument> {
        let extraction_error = |message: String| RagError::ExtractionError {
            source_uri: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| extraction_error(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| extraction_error(e.to_string()))?;

        let body = response.text().await.map_err(|e| extraction_error(e.to_string()))?;
        Ok(SourceDocument::new(url, html_to_text(&body)))
    }

    /// Fetch every URL in order, skipping (and logging) the ones that fail.
    pub async fn extract(&self, urls: &[String]) -> Vec<SourceDocument> {
        let mut documents = Vec::with_capacity(urls.len());
        for url in urls {
            info!(%url, "fetching content");
            match self.fetch(url).await {
                Ok(document) => {
                    info!(%url, text_len = document.text.len(), "extracted text");
                    documents.push(document);
                }
                Err(e) => warn!(%url, error = %e, "skipping source"),
            }
        }
        documents
    }
}
