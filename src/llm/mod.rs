pub mod client;
pub mod prompts;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::dedup::ClaimSummary;
use crate::models::{
    AcceptedClaim, CandidateClaim, PendingClaim, ScoredDocument, VerificationOutcome,
};
use crate::session::{ClaimExtractor, ExtractionOutput};
use crate::verify::ClaimVerifier;

pub use client::{AnthropicClient, AnthropicConfig, Tool};
pub use prompts::{EXTRACTION_SYSTEM_PROMPT, VERIFICATION_SYSTEM_PROMPT};

/// Claim extraction backed by the Anthropic API.
///
/// The tool input is parsed strictly: a malformed response is an error the
/// orchestrator turns into an empty window, never a half-parsed claim.
pub struct AnthropicExtractor {
    client: AnthropicClient,
}

impl AnthropicExtractor {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClaimExtractor for AnthropicExtractor {
    async fn extract(
        &self,
        window_text: &str,
        previous_pending: Option<&PendingClaim>,
        recent_summaries: &[ClaimSummary],
    ) -> Result<ExtractionOutput> {
        let prompt = prompts::build_extraction_prompt(window_text, previous_pending, recent_summaries);
        let input = self
            .client
            .send_tool_call(EXTRACTION_SYSTEM_PROMPT, &prompt, extraction_tool())
            .await?;
        let report: ClaimReport =
            serde_json::from_value(input).context("Failed to parse tool input as ClaimReport")?;
        Ok(ExtractionOutput {
            claims: report.claims,
            pending: report.pending,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ClaimReport {
    claims: Vec<CandidateClaim>,
    #[serde(default)]
    pending: Option<PendingClaim>,
}

fn extraction_tool() -> Tool {
    Tool {
        name: "report_claims".to_string(),
        description: "Report the research claims found in this transcript window".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "claims": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "segment_text": {"type": "string"},
                            "search_query": {
                                "type": "string",
                                "description": "3-6 words: researcher (if named) plus topic"
                            },
                            "confidence": {"type": "string", "enum": ["high", "medium", "low"]},
                            "author_mentioned": {"type": ["string", "null"]},
                            "institution_mentioned": {"type": ["string", "null"]},
                            "finding_summary": {"type": "string"}
                        },
                        "required": ["segment_text", "search_query", "confidence", "finding_summary"]
                    }
                },
                "pending": {
                    "type": ["object", "null"],
                    "properties": {
                        "partial_text": {"type": "string"},
                        "status": {"type": "string", "enum": ["truncated_start", "truncated_end"]},
                        "has_attribution": {"type": "boolean"},
                        "has_finding": {"type": "boolean"},
                        "missing": {"type": "string"}
                    },
                    "required": ["partial_text", "status", "has_attribution", "has_finding", "missing"]
                }
            },
            "required": ["claims"]
        }),
    }
}

/// Claim verification backed by the Anthropic API
pub struct AnthropicVerifier {
    client: AnthropicClient,
}

impl AnthropicVerifier {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClaimVerifier for AnthropicVerifier {
    async fn verify(
        &self,
        claim: &AcceptedClaim,
        document: &ScoredDocument,
    ) -> Result<VerificationOutcome> {
        let prompt = prompts::build_verification_prompt(
            &claim.segment_text,
            &claim.finding_summary,
            claim.author_mentioned.as_deref(),
            claim.institution_mentioned.as_deref(),
            document,
        );
        let input = self
            .client
            .send_tool_call(VERIFICATION_SYSTEM_PROMPT, &prompt, verdict_tool())
            .await?;
        serde_json::from_value(input).context("Failed to parse tool input as VerificationOutcome")
    }
}

fn verdict_tool() -> Tool {
    Tool {
        name: "submit_verdict".to_string(),
        description: "Submit the verdict comparing the claim against the paper".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "verdict": {
                    "type": "string",
                    "enum": ["supported", "partially_supported", "contradicted", "unverifiable"]
                },
                "confidence": {"type": "string", "enum": ["high", "medium", "low"]},
                "explanation": {"type": "string"},
                "matching_details": {"type": "array", "items": {"type": "string"}},
                "key_differences": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["verdict", "confidence", "explanation"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_report_parses_strictly() {
        let json = serde_json::json!({
            "claims": [{
                "segment_text": "Candow found creatine helps memory",
                "search_query": "candow creatine memory",
                "confidence": "high",
                "author_mentioned": "Dr. Candow",
                "institution_mentioned": null,
                "finding_summary": "creatine improves memory"
            }],
            "pending": null
        });
        let report: ClaimReport = serde_json::from_value(json).unwrap();
        assert_eq!(report.claims.len(), 1);
        assert!(report.pending.is_none());
    }

    #[test]
    fn test_malformed_report_fails_closed() {
        // Missing finding_summary: the parse fails rather than producing a
        // partial claim.
        let json = serde_json::json!({
            "claims": [{
                "segment_text": "x",
                "search_query": "y",
                "confidence": "high"
            }]
        });
        assert!(serde_json::from_value::<ClaimReport>(json).is_err());
    }

    #[test]
    fn test_verdict_parses_with_optional_lists() {
        let json = serde_json::json!({
            "verdict": "partially_supported",
            "confidence": "medium",
            "explanation": "narrower population"
        });
        let outcome: VerificationOutcome = serde_json::from_value(json).unwrap();
        assert!(outcome.matching_details.is_empty());
    }
}
