//! Generation service trait for free-form and schema-constrained text.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// How the generation service should shape its output.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Unconstrained text.
    Text,
    /// A JSON object conforming to `schema`.
    JsonSchema {
        /// Schema name sent to the provider.
        name: String,
        /// JSON Schema the response must satisfy.
        schema: Value,
    },
}

/// A single-turn prompt for a [`TextGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The user prompt.
    pub prompt: String,
    /// Requested output shape.
    pub response_format: ResponseFormat,
    /// Sampling temperature, if the caller wants to override the provider default.
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// A free-form text request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), response_format: ResponseFormat::Text, temperature: None }
    }

    /// A request whose response must be JSON matching `schema`.
    pub fn json_schema(prompt: impl Into<String>, name: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_format: ResponseFormat::JsonSchema { name: name.into(), schema },
            temperature: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A language-model backend that answers a prompt with text.
///
/// # Example
///
/// ```rust,ignore
/// use factcheck_verify::{GenerationRequest, TextGenerator};
///
/// let passage = generator.generate(GenerationRequest::text("Explain RAG.")).await?;
/// ```
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model or backend name, used in logs and errors.
    fn name(&self) -> &str;

    /// Generate a response to `request`.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}
