use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::models::{
    AcceptedClaim, Confidence, MatchQuality, ScoredDocument, SearchAttempt, VerificationOutcome,
    Verdict, VerifiedClaim,
};
use crate::scoring::{extract_keywords, MatchScorer};
use crate::search::DocumentSearcher;

/// External claim-verification collaborator (an LLM reading the abstract)
#[async_trait]
pub trait ClaimVerifier: Send + Sync {
    async fn verify(
        &self,
        claim: &AcceptedClaim,
        document: &ScoredDocument,
    ) -> anyhow::Result<VerificationOutcome>;
}

/// Thresholds for the verification flow
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// A match this good stops the search early
    pub stop_score: f64,
    /// Below this the claim is unverifiable without calling the verifier
    pub min_match_score: f64,
    /// Most distinct queries tried per claim
    pub max_queries: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            stop_score: 0.5,
            min_match_score: 0.4,
            max_queries: 5,
        }
    }
}

/// Drives document search, match scoring, and the external verification call
/// for one claim at a time.
pub struct Verifier {
    searchers: Vec<Box<dyn DocumentSearcher>>,
    verifier: Box<dyn ClaimVerifier>,
    scorer: MatchScorer,
    config: VerifyConfig,
}

impl Verifier {
    pub fn new(
        searchers: Vec<Box<dyn DocumentSearcher>>,
        verifier: Box<dyn ClaimVerifier>,
        scorer: MatchScorer,
        config: VerifyConfig,
    ) -> Self {
        Self {
            searchers,
            verifier,
            scorer,
            config,
        }
    }

    /// Verify one claim against the literature.
    ///
    /// Queries are tried strictly in sequence: later queries are only worth
    /// their cost if earlier ones under-perform.
    pub async fn verify(&self, claim: &AcceptedClaim) -> VerifiedClaim {
        let queries = build_query_ladder(claim, self.config.max_queries);
        let mut attempts: Vec<SearchAttempt> = Vec::new();
        let mut best: Option<ScoredDocument> = None;

        'queries: for query in &queries {
            for searcher in &self.searchers {
                let documents = match searcher.search(query).await {
                    Ok(documents) => documents,
                    Err(e) => {
                        warn!(query = %query, source = searcher.source(), error = %e, "search failed");
                        attempts.push(SearchAttempt {
                            query: query.clone(),
                            source: searcher.source().to_string(),
                            result_count: 0,
                            top_result: None,
                        });
                        continue;
                    }
                };
                attempts.push(SearchAttempt {
                    query: query.clone(),
                    source: searcher.source().to_string(),
                    result_count: documents.len(),
                    top_result: documents.first().map(|d| d.title.clone()),
                });

                let ranked = self.scorer.rank_papers(&documents, claim);
                let Some(top) = ranked.into_iter().next() else {
                    continue;
                };
                debug!(
                    query = %query,
                    source = searcher.source(),
                    score = top.score.total_score,
                    "scored search results"
                );
                let top_score = top.score.total_score;
                if best
                    .as_ref()
                    .is_none_or(|b| top_score > b.score.total_score)
                {
                    best = Some(top);
                }
                if top_score > self.config.stop_score {
                    break 'queries;
                }
            }
        }

        let result = match &best {
            None => {
                info!(claim_id = %claim.claim_id, "no papers found");
                VerificationOutcome {
                    verdict: Verdict::NoPaperFound,
                    confidence: Confidence::High,
                    explanation: "No relevant papers were found for this claim.".to_string(),
                    matching_details: vec![],
                    key_differences: vec![],
                }
            }
            Some(paper) => self.judge(claim, paper).await,
        };

        VerifiedClaim {
            claim: claim.clone(),
            attempts,
            best_paper: best,
            result,
            verified_at: chrono::Utc::now(),
        }
    }

    /// Verify claims one at a time, in order
    pub async fn verify_all(&self, claims: &[AcceptedClaim]) -> Vec<VerifiedClaim> {
        let mut verified = Vec::with_capacity(claims.len());
        for claim in claims {
            verified.push(self.verify(claim).await);
        }
        verified
    }

    async fn judge(&self, claim: &AcceptedClaim, paper: &ScoredDocument) -> VerificationOutcome {
        if paper.score.quality == MatchQuality::None
            || paper.score.total_score < self.config.min_match_score
        {
            return VerificationOutcome {
                verdict: Verdict::Unverifiable,
                confidence: Confidence::Low,
                explanation: format!(
                    "Best match \"{}\" is too weak a match ({:?}, score {:.2}) to verify against.",
                    paper.document.title, paper.score.quality, paper.score.total_score
                ),
                matching_details: vec![],
                key_differences: vec![],
            };
        }

        // No abstract means nothing to compare the claim against
        if !paper.document.has_abstract() {
            return VerificationOutcome {
                verdict: Verdict::Unverifiable,
                confidence: Confidence::Low,
                explanation: format!(
                    "\"{}\" matched well but has no abstract to compare against.",
                    paper.document.title
                ),
                matching_details: vec![],
                key_differences: vec![],
            };
        }

        match self.verifier.verify(claim, paper).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(claim_id = %claim.claim_id, error = %e, "verification call failed");
                VerificationOutcome::verifier_failed()
            }
        }
    }
}

/// Ordered, deduplicated search strategies for a claim, capped at `max`
fn build_query_ladder(claim: &AcceptedClaim, max: usize) -> Vec<String> {
    let finding_keywords = extract_keywords(&claim.finding_summary);

    let mut candidates: Vec<String> = Vec::new();
    candidates.push(claim.primary_query.clone());

    if let Some(surname) = claim.author_surname() {
        let head: Vec<&str> = finding_keywords.iter().map(String::as_str).take(4).collect();
        if !head.is_empty() {
            candidates.push(format!("{} {}", surname, head.join(" ")));
        }
    }

    let summary_head: String = claim.finding_summary.chars().take(100).collect();
    if !summary_head.trim().is_empty() {
        candidates.push(summary_head.trim().to_string());
    }

    if let Some(institution) = claim
        .institution_mentioned
        .as_deref()
        .filter(|i| !i.trim().is_empty())
    {
        let head: Vec<&str> = finding_keywords.iter().map(String::as_str).take(3).collect();
        candidates.push(format!("{} {}", institution, head.join(" ")).trim().to_string());
    }

    candidates.extend(claim.fallback_queries.iter().cloned());

    if !finding_keywords.is_empty() {
        candidates.push(finding_keywords.join(" "));
    }

    let mut queries: Vec<String> = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && !queries.contains(&candidate) {
            queries.push(candidate);
        }
        if queries.len() == max {
            break;
        }
    }
    queries
}
