use crate::dedup::ClaimSummary;
use crate::models::{PendingClaim, PendingStatus, ScoredDocument};

/// System prompt for claim extraction (non-negotiable constraints)
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You extract verifiable research claims from video transcript windows. You MUST follow these rules:

1. Only report claims that reference a specific study, researcher, or research finding.
2. Never report opinions, anecdotes, general advice, or the speaker's own experience.
3. The transcript window overlaps the previous one: claims listed under "Already captured" are ALREADY recorded. Do not report them again, even reworded.
4. If a claim is cut off at the start or end of the window, report it as pending instead of guessing the missing half.
5. Output MUST be submitted via the report_claims tool and match its schema.
6. If there are no new claims, submit an empty claims array.

For each claim provide:
- segment_text: the transcript excerpt, verbatim
- search_query: 3-6 words naming the researcher (if any) and the topic
- confidence: high only when a study or researcher is named explicitly
- author_mentioned / institution_mentioned: exactly as spoken, or null
- finding_summary: one sentence stating the factual finding"#;

/// Build the user prompt for one extraction window
pub fn build_extraction_prompt(
    window_text: &str,
    previous_pending: Option<&PendingClaim>,
    recent_summaries: &[ClaimSummary],
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Transcript window\n");
    prompt.push_str(window_text);
    prompt.push_str("\n\n");

    if let Some(pending) = previous_pending {
        prompt.push_str("## Incomplete claim from the previous window\n");
        let status = match pending.status {
            PendingStatus::TruncatedStart => "the beginning was cut off",
            PendingStatus::TruncatedEnd => "the end was cut off",
        };
        prompt.push_str(&format!(
            "Partial text ({status}): \"{}\"\nAttribution heard: {}. Finding heard: {}. Missing: {}\n",
            pending.partial_text, pending.has_attribution, pending.has_finding, pending.missing
        ));
        prompt.push_str(
            "If this window completes it, report it first in the claims array and clear pending. \
If it is still incomplete, carry it in the pending field. If the topic moved on, drop it.\n\n",
        );
    }

    if !recent_summaries.is_empty() {
        prompt.push_str("## Already captured (do NOT report again)\n");
        for summary in recent_summaries {
            match &summary.author {
                Some(author) => {
                    prompt.push_str(&format!("- [{}] {}: {}\n", summary.window, author, summary.topic))
                }
                None => prompt.push_str(&format!("- [{}] {}\n", summary.window, summary.topic)),
            }
        }
        prompt.push('\n');
    }

    prompt.push_str("## Instructions\n");
    prompt.push_str("Report new research claims from this window with the report_claims tool.\n");

    prompt
}

/// System prompt for verifying a claim against a paper abstract
pub const VERIFICATION_SYSTEM_PROMPT: &str = r#"You judge whether a research paper supports a claim made in a video. You MUST follow these rules:

1. Judge ONLY from the provided title, metadata, and abstract. Never use outside knowledge of the paper.
2. supported: the abstract states the claimed finding.
3. partially_supported: the abstract states a weaker or narrower version of it.
4. contradicted: the abstract states the opposite.
5. unverifiable: the abstract does not address the claimed finding.
6. Output MUST be submitted via the submit_verdict tool."#;

/// Build the user prompt for one verification call
pub fn build_verification_prompt(
    segment_text: &str,
    finding_summary: &str,
    author_mentioned: Option<&str>,
    institution_mentioned: Option<&str>,
    paper: &ScoredDocument,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Claim from the video\n");
    prompt.push_str(&format!("Said: \"{segment_text}\"\n"));
    prompt.push_str(&format!("Finding claimed: {finding_summary}\n"));
    if let Some(author) = author_mentioned {
        prompt.push_str(&format!("Attributed to: {author}\n"));
    }
    if let Some(institution) = institution_mentioned {
        prompt.push_str(&format!("Institution mentioned: {institution}\n"));
    }
    prompt.push('\n');

    let doc = &paper.document;
    prompt.push_str("# Candidate paper\n");
    prompt.push_str(&format!("Title: {}\n", doc.title));
    if !doc.authors.is_empty() {
        prompt.push_str(&format!("Authors: {}\n", doc.authors.join(", ")));
    }
    if let Some(year) = doc.year {
        prompt.push_str(&format!("Year: {year}\n"));
    }
    if let Some(venue) = &doc.venue {
        prompt.push_str(&format!("Venue: {venue}\n"));
    }
    prompt.push_str(&format!(
        "Match scores: author {:.2}, topic {:.2}, year {:.2}, abstract {:.2}\n\n",
        paper.score.author_score,
        paper.score.topic_score,
        paper.score.year_score,
        paper.score.abstract_score
    ));
    if let Some(abstract_text) = &doc.abstract_text {
        prompt.push_str("# Abstract\n");
        prompt.push_str(abstract_text);
        prompt.push('\n');
    }

    prompt.push_str("\n## Instructions\n");
    prompt.push_str("Compare the claimed finding against the abstract and submit a verdict with the submit_verdict tool.\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_includes_pending_and_summaries() {
        let pending = PendingClaim {
            partial_text: "a 2021 study by Dr.".to_string(),
            status: PendingStatus::TruncatedEnd,
            has_attribution: true,
            has_finding: false,
            missing: "the finding".to_string(),
        };
        let summaries = vec![ClaimSummary {
            window: 3,
            author: Some("jose antonio".to_string()),
            topic: "protein overfeeding body composition".to_string(),
        }];
        let prompt = build_extraction_prompt("window text here", Some(&pending), &summaries);
        assert!(prompt.contains("window text here"));
        assert!(prompt.contains("a 2021 study by Dr."));
        assert!(prompt.contains("the end was cut off"));
        assert!(prompt.contains("protein overfeeding body composition"));
    }

    #[test]
    fn test_extraction_prompt_minimal() {
        let prompt = build_extraction_prompt("just text", None, &[]);
        assert!(prompt.contains("just text"));
        assert!(!prompt.contains("Incomplete claim"));
        assert!(!prompt.contains("Already captured"));
    }
}
