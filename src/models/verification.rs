use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::claim::{AcceptedClaim, Confidence};
use super::document::ScoredDocument;

/// Outcome of comparing a claim against the best-matching document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Supported,
    PartiallySupported,
    Contradicted,
    Unverifiable,
    NoPaperFound,
}

/// Result of the external verification call (or a local short-circuit)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matching_details: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_differences: Vec<String>,
}

impl VerificationOutcome {
    /// Fallback substituted when the external verification call fails
    pub fn verifier_failed() -> Self {
        Self {
            verdict: Verdict::Unverifiable,
            confidence: Confidence::Low,
            explanation: "Verification failed due to an error.".to_string(),
            matching_details: vec![],
            key_differences: vec![],
        }
    }
}

/// One search call made while looking for sources, recorded regardless of outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAttempt {
    pub query: String,
    pub source: String,
    pub result_count: usize,
    /// Title of the top raw (pre-scoring) result, if any
    pub top_result: Option<String>,
}

/// A claim with its full verification trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedClaim {
    pub claim: AcceptedClaim,
    pub attempts: Vec<SearchAttempt>,
    pub best_paper: Option<ScoredDocument>,
    pub result: VerificationOutcome,
    pub verified_at: DateTime<Utc>,
}
