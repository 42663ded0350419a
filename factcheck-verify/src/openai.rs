//! OpenAI chat completions generator.

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
        ResponseFormat as ApiResponseFormat, ResponseFormatJsonSchema,
    },
};
use async_trait::async_trait;
use factcheck_rag::ServiceErrorKind;
use tracing::{debug, error};

use crate::error::{Result, VerifyError};
use crate::generation::{GenerationRequest, ResponseFormat, TextGenerator};

/// Model used for hypothetical-document expansion.
pub const DEFAULT_HYDE_MODEL: &str = "gpt-4o-mini";
/// Model used for adjudication.
pub const DEFAULT_ADJUDICATION_MODEL: &str = "gpt-4o";

/// A [`TextGenerator`] backed by the OpenAI chat completions API.
///
/// Works with any OpenAI-compatible endpoint via [`with_base_url`](Self::with_base_url).
/// JSON-schema requests are sent with `strict` structured outputs enabled.
///
/// # Example
///
/// ```rust,ignore
/// use factcheck_verify::OpenAIGenerator;
///
/// let hyde = OpenAIGenerator::from_env("gpt-4o-mini")?;
/// let judge = OpenAIGenerator::from_env("gpt-4o")?;
/// ```
#[derive(Clone)]
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    api_key: String,
    model: String,
}

impl OpenAIGenerator {
    /// Create a generator with an explicit API key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(VerifyError::Config("OpenAI API key must not be empty".to_string()));
        }
        let config = OpenAIConfig::new().with_api_key(&api_key);
        Ok(Self { client: Client::with_config(config), api_key, model: model.into() })
    }

    /// Create a generator reading the API key from `OPENAI_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            VerifyError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key, model)
    }

    /// Point the client at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(&self.api_key).with_api_base(base_url);
        self.client = Client::with_config(config);
        self
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn failure(&self, kind: ServiceErrorKind, message: impl Into<String>) -> VerifyError {
        VerifyError::Generation { model: self.model.clone(), kind, message: message.into() }
    }
}

impl std::fmt::Debug for OpenAIGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIGenerator").field("model", &self.model).finish_non_exhaustive()
    }
}

/// Map an `async-openai` error onto the shared failure taxonomy.
fn classify(error: &OpenAIError) -> ServiceErrorKind {
    match error {
        OpenAIError::ApiError(api) => {
            let code = api.code.as_ref().map(ToString::to_string);
            code.as_deref()
                .and_then(ServiceErrorKind::from_error_code)
                .or_else(|| api.r#type.as_deref().and_then(ServiceErrorKind::from_error_code))
                .unwrap_or(ServiceErrorKind::Unknown)
        }
        OpenAIError::Reqwest(err) if err.is_timeout() => ServiceErrorKind::Timeout,
        OpenAIError::Reqwest(err) => err
            .status()
            .map(|status| ServiceErrorKind::from_http(status.as_u16(), None))
            .unwrap_or(ServiceErrorKind::Unknown),
        _ => ServiceErrorKind::Unknown,
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt)
            .build()
            .map_err(|e| self.failure(ServiceErrorKind::Unknown, format!("bad message: {e}")))?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(messages);

        if let Some(temperature) = request.temperature {
            request_builder.temperature(temperature);
        }
        if let ResponseFormat::JsonSchema { name, schema } = request.response_format {
            request_builder.response_format(ApiResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name,
                    schema: Some(schema),
                    strict: Some(true),
                },
            });
        }

        let openai_request = request_builder
            .build()
            .map_err(|e| self.failure(ServiceErrorKind::Unknown, format!("bad request: {e}")))?;

        debug!(model = %self.model, "sending chat completion request");

        let response = self.client.chat().create(openai_request).await.map_err(|e| {
            let kind = classify(&e);
            error!(model = %self.model, %kind, error = %e, "chat completion failed");
            self.failure(kind, e.to_string())
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| self.failure(ServiceErrorKind::Unknown, "response contained no content"))
    }
}
