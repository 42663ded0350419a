//! Verdict types produced for each claim.

use std::fmt;

use factcheck_rag::EvidenceItem;
use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// Reason recorded when retrieval finds nothing.
pub const NO_DOCUMENTS_REASON: &str = "No relevant documents found.";

/// Classification of a claim against its evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// The evidence supports the claim.
    Supported,
    /// The evidence contradicts the claim.
    Refuted,
    /// The evidence is insufficient to decide.
    #[serde(rename = "Not Enough Information")]
    NotEnoughInformation,
    /// Verification failed or the adjudication could not be read.
    Error,
}

impl Decision {
    /// Canonical display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supported => "Supported",
            Self::Refuted => "Refuted",
            Self::NotEnoughInformation => "Not Enough Information",
            Self::Error => "Error",
        }
    }

    /// Parse a label, ignoring case, spaces, underscores and hyphens.
    ///
    /// Returns `None` for anything that is not one of the four labels.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "supported" => Some(Self::Supported),
            "refuted" => Some(Self::Refuted),
            "notenoughinformation" => Some(Self::NotEnoughInformation),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of verifying one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// The claim as given.
    pub claim: String,
    /// Similarity score in `[0, 100]`; 0 when verification did not reach scoring.
    pub score: u8,
    /// The decision.
    pub decision: Decision,
    /// Free-text justification or failure description.
    pub reason: String,
    /// Evidence in relevance order.
    pub evidence: Vec<EvidenceItem>,
}

impl Verdict {
    /// A verdict for a claim with no usable evidence.
    pub fn not_enough_information(claim: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            score: 0,
            decision: Decision::NotEnoughInformation,
            reason: reason.into(),
            evidence: Vec::new(),
        }
    }

    /// A verdict for a claim whose verification failed at some stage.
    pub fn failed(claim: impl Into<String>, error: &StageError) -> Self {
        Self {
            claim: claim.into(),
            score: 0,
            decision: Decision::Error,
            reason: error.to_string(),
            evidence: Vec::new(),
        }
    }

    /// Similarity as a fraction in `[0, 1]`.
    pub fn similarity(&self) -> f32 {
        f32::from(self.score) / 100.0
    }
}
