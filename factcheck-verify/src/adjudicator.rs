//! LLM adjudication of a claim against ranked evidence.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use factcheck_rag::EvidenceItem;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{Stage, StageError, with_deadline};
use crate::generation::{GenerationRequest, TextGenerator};
use crate::verdict::Decision;

/// Reason used when the response carries no usable reason text.
pub const DEFAULT_REASON: &str = "No reason provided.";

const SCHEMA_NAME: &str = "fact_check_verdict";

/// A decision and its justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjudication {
    /// The decision.
    pub decision: Decision,
    /// Justification from the model, or a description of why it could not be read.
    pub reason: String,
}

/// Build the adjudication prompt.
///
/// Evidence is listed in relevance order as `N. "text" (Source: source)`.
pub fn build_prompt(claim: &str, evidence: &[EvidenceItem], score: u8) -> String {
    let mut evidence_lines = String::new();
    for (i, item) in evidence.iter().enumerate() {
        let _ = writeln!(evidence_lines, "{}. \"{}\" (Source: {})", i + 1, item.text, item.source);
    }

    format!(
        "You are a strict and objective fact-checker. Decide whether the claim below is \
         supported by the evidence.\n\n\
         Claim: \"{claim}\"\n\n\
         Quantitative similarity score between the claim and the top evidence: {score}/100.\n\
         This score measures semantic overlap only. It can be high even when the evidence \
         contradicts the claim (for example through negation), so do not treat it as proof.\n\n\
         Evidence (most relevant first):\n{evidence_lines}\n\
         Answer with exactly one decision: \"Supported\", \"Refuted\" or \
         \"Not Enough Information\". In \"reason\", explain the decision with reference to the \
         score and the numbered evidence."
    )
}

/// JSON Schema the adjudication response must satisfy.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "decision": {
                "type": "string",
                "enum": ["Supported", "Refuted", "Not Enough Information"]
            },
            "reason": { "type": "string" }
        },
        "required": ["decision", "reason"],
        "additionalProperties": false
    })
}

/// Strip a surrounding Markdown code fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Read an adjudication response, never failing.
///
/// Unparseable JSON, a missing or unknown decision, or a missing reason
/// degrade to [`Decision::Error`] and/or [`DEFAULT_REASON`].
pub fn parse_response(raw: &str) -> Adjudication {
    let value: Value = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "adjudication response is not valid JSON");
            return Adjudication {
                decision: Decision::Error,
                reason: format!("Could not parse adjudication response: {e}"),
            };
        }
    };

    let decision = value
        .get("decision")
        .and_then(Value::as_str)
        .and_then(Decision::parse)
        .unwrap_or_else(|| {
            warn!(response = %value, "adjudication response has no recognizable decision");
            Decision::Error
        });
    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REASON)
        .to_string();

    Adjudication { decision, reason }
}

/// Asks a generation service to classify a claim against its evidence.
pub struct Adjudicator {
    generator: Arc<dyn TextGenerator>,
    call_timeout: Duration,
}

impl Adjudicator {
    /// Create an adjudicator.
    pub fn new(generator: Arc<dyn TextGenerator>, call_timeout: Duration) -> Self {
        Self { generator, call_timeout }
    }

    /// Classify `claim` given ranked `evidence` and its similarity `score`.
    ///
    /// Only the service call itself can fail; a response that cannot be read
    /// is returned as [`Decision::Error`].
    pub async fn adjudicate(
        &self,
        claim: &str,
        evidence: &[EvidenceItem],
        score: u8,
    ) -> Result<Adjudication, StageError> {
        let prompt = build_prompt(claim, evidence, score);
        let request = GenerationRequest::json_schema(prompt, SCHEMA_NAME, response_schema())
            .with_temperature(0.0);

        let raw = with_deadline(
            Stage::Adjudication,
            self.call_timeout,
            self.generator.generate(request),
        )
        .await?;

        let adjudication = parse_response(&raw);
        debug!(
            generator = self.generator.name(),
            decision = %adjudication.decision,
            "adjudication complete"
        );
        Ok(adjudication)
    }
}

impl std::fmt::Debug for Adjudicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adjudicator")
            .field("generator", &self.generator.name())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}
