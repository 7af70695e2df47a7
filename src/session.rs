use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::authors::AuthorNormalizer;
use crate::dedup::{ClaimSummary, DedupConfig, Deduplicator};
use crate::models::{AcceptedClaim, CandidateClaim, DetectionRecord, PendingClaim};
use crate::queries::build_queries;
use crate::window::WindowBuffer;

/// Phrases that mark a chunk as sponsor/ad content. Matched case-insensitively
/// as substrings; a flagged chunk is never buffered or sent to extraction.
const SPONSOR_MARKERS: &[&str] = &[
    "sponsor",
    "discount code",
    "link in description",
    "use code",
    "promo",
    "check out",
    "brought to you by",
    "affiliate",
    "coupon",
];

/// What one extraction call returns for a window
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutput {
    pub claims: Vec<CandidateClaim>,
    pub pending: Option<PendingClaim>,
}

/// External claim-extraction collaborator (an LLM call in production,
/// a fake in tests).
#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    async fn extract(
        &self,
        window_text: &str,
        previous_pending: Option<&PendingClaim>,
        recent_summaries: &[ClaimSummary],
    ) -> anyhow::Result<ExtractionOutput>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Programming error in the caller, not a runtime condition
    #[error("process_chunk called before start_session")]
    NotStarted,
}

/// Counters for one session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub windows_processed: u64,
    pub claims_accepted: usize,
    pub duplicates_skipped: usize,
    pub sponsor_chunks_skipped: usize,
    pub extraction_failures: usize,
    pub pending_active: bool,
}

/// All mutable state for one extraction session. Buffer, pending carry-over,
/// and dedup history mutate together per window, so they live together.
struct SessionState {
    session_id: String,
    window_id: u64,
    pending: Option<PendingClaim>,
    /// Window at which the current pending chain began
    pending_since: Option<u64>,
    buffer: WindowBuffer,
    dedup: Deduplicator,
    claims: Vec<AcceptedClaim>,
    stats: SessionStats,
}

impl SessionState {
    fn new(session_id: String, dedup_config: DedupConfig) -> Self {
        Self {
            session_id,
            window_id: 0,
            pending: None,
            pending_since: None,
            buffer: WindowBuffer::new(),
            dedup: Deduplicator::new(dedup_config),
            claims: Vec::new(),
            stats: SessionStats::default(),
        }
    }
}

/// Drives the window buffer, the external extraction call, the pending-claim
/// carry-over, and the deduplicator to turn a stream of transcript fragments
/// into a stream of accepted claims.
///
/// `process_chunk` calls for one session must be serialized: pipelining chunks
/// would corrupt the window ordering and the pending carry-over. Different
/// sessions are fully independent.
pub struct LiveExtractor {
    extractor: Box<dyn ClaimExtractor>,
    normalizer: AuthorNormalizer,
    dedup_config: DedupConfig,
    session: Option<SessionState>,
}

impl LiveExtractor {
    pub fn new(extractor: Box<dyn ClaimExtractor>) -> Self {
        Self {
            extractor,
            normalizer: AuthorNormalizer::default(),
            dedup_config: DedupConfig::default(),
            session: None,
        }
    }

    pub fn with_dedup_config(mut self, config: DedupConfig) -> Self {
        self.dedup_config = config;
        self
    }

    /// Begin a fresh session, discarding any previous session state
    pub fn start_session(&mut self, session_id: &str) {
        info!(session_id, "starting extraction session");
        self.session = Some(SessionState::new(
            session_id.to_string(),
            self.dedup_config.clone(),
        ));
    }

    /// Process one transcript fragment and return the claims newly accepted in
    /// this step (never re-emits earlier claims).
    pub async fn process_chunk(&mut self, text: &str) -> Result<Vec<AcceptedClaim>, SessionError> {
        let state = self.session.as_mut().ok_or(SessionError::NotStarted)?;

        state.window_id += 1;
        state.stats.windows_processed = state.window_id;
        let window_id = state.window_id;

        if is_sponsor_content(text) {
            debug!(window_id, "skipping sponsor/ad chunk");
            state.stats.sponsor_chunks_skipped += 1;
            return Ok(vec![]);
        }

        let window_text = state.buffer.add_chunk(text);
        let summaries = state.dedup.recent_summaries();

        // Fails soft: a bad window contributes zero claims and leaves the
        // pending state untouched, the session continues.
        let output = match self
            .extractor
            .extract(&window_text, state.pending.as_ref(), &summaries)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(window_id, error = %e, "extraction failed, continuing");
                state.stats.extraction_failures += 1;
                ExtractionOutput {
                    claims: vec![],
                    pending: state.pending.clone(),
                }
            }
        };

        let had_pending_since = state.pending_since;
        let resolved_pending = state.pending.is_some() && output.pending.is_none();
        state.pending = output.pending;
        state.pending_since = match (&state.pending, had_pending_since) {
            (Some(_), Some(since)) => Some(since),
            (Some(_), None) => Some(window_id),
            (None, _) => None,
        };
        state.stats.pending_active = state.pending.is_some();

        let mut accepted = Vec::new();
        for (i, candidate) in output.claims.into_iter().enumerate() {
            let author = self
                .normalizer
                .normalize(candidate.author_mentioned.as_deref());

            if state.dedup.is_duplicate(&candidate, &author, window_id) {
                debug!(window_id, query = %candidate.search_query, "skipping duplicate claim");
                state.stats.duplicates_skipped += 1;
                continue;
            }
            state.dedup.record(&candidate, &author, window_id);

            // The first claim of a step that resolved a carry-over completes
            // the pending chain; its detection reaches back to where the
            // chain began.
            let first_seen = if i == 0 && resolved_pending {
                had_pending_since.unwrap_or(window_id)
            } else {
                window_id
            };

            let timestamps = state.buffer.timestamps_for(window_id);
            let queries = build_queries(&candidate, &author);
            let claim = AcceptedClaim {
                claim_id: format!(
                    "{}_live_{}_{}_{}",
                    state.session_id,
                    window_id,
                    i,
                    chrono::Utc::now().timestamp_millis()
                ),
                segment_text: candidate.segment_text,
                finding_summary: candidate.finding_summary,
                confidence: candidate.confidence,
                author_mentioned: candidate.author_mentioned,
                author_normalized: author.normalized,
                author_variants: author.variants,
                institution_mentioned: candidate.institution_mentioned,
                primary_query: queries.primary,
                fallback_queries: queries.fallbacks,
                detection: DetectionRecord {
                    window_first_seen: first_seen,
                    window_completed: window_id,
                    latency_windows: window_id.saturating_sub(first_seen),
                },
                start_timestamp: timestamps.start,
                end_timestamp: timestamps.end,
            };
            info!(
                window_id,
                claim_id = %claim.claim_id,
                query = %claim.primary_query,
                "accepted claim"
            );
            state.claims.push(claim.clone());
            accepted.push(claim);
        }
        state.stats.claims_accepted = state.claims.len();

        Ok(accepted)
    }

    /// All claims accepted so far in the current session
    pub fn all_claims(&self) -> &[AcceptedClaim] {
        self.session.as_ref().map_or(&[], |s| s.claims.as_slice())
    }

    pub fn session_stats(&self) -> SessionStats {
        self.session
            .as_ref()
            .map(|s| s.stats.clone())
            .unwrap_or_default()
    }
}

/// Whether a chunk looks like sponsor/ad content
pub fn is_sponsor_content(text: &str) -> bool {
    let lower = text.to_lowercase();
    SPONSOR_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::{Confidence, PendingStatus};

    fn candidate(query: &str, author: Option<&str>, finding: &str) -> CandidateClaim {
        CandidateClaim {
            segment_text: format!("segment about {query}"),
            search_query: query.to_string(),
            confidence: Confidence::High,
            author_mentioned: author.map(String::from),
            institution_mentioned: None,
            finding_summary: finding.to_string(),
        }
    }

    type CallLog = Arc<Mutex<Vec<(String, Option<PendingClaim>, usize)>>>;

    /// Scripted extractor: pops one ExtractionOutput per call and records
    /// everything it was called with.
    struct ScriptedExtractor {
        script: Mutex<Vec<ExtractionOutput>>,
        calls: CallLog,
    }

    impl ScriptedExtractor {
        fn new(mut outputs: Vec<ExtractionOutput>) -> Self {
            outputs.reverse();
            Self {
                script: Mutex::new(outputs),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ClaimExtractor for ScriptedExtractor {
        async fn extract(
            &self,
            window_text: &str,
            previous_pending: Option<&PendingClaim>,
            recent_summaries: &[ClaimSummary],
        ) -> anyhow::Result<ExtractionOutput> {
            self.calls.lock().unwrap().push((
                window_text.to_string(),
                previous_pending.cloned(),
                recent_summaries.len(),
            ));
            self.script
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl ClaimExtractor for FailingExtractor {
        async fn extract(
            &self,
            _window_text: &str,
            _previous_pending: Option<&PendingClaim>,
            _recent_summaries: &[ClaimSummary],
        ) -> anyhow::Result<ExtractionOutput> {
            anyhow::bail!("model unavailable")
        }
    }

    #[tokio::test]
    async fn test_process_chunk_before_start_session_fails_fast() {
        let mut live = LiveExtractor::new(Box::new(FailingExtractor));
        assert!(matches!(
            live.process_chunk("text").await,
            Err(SessionError::NotStarted)
        ));
    }

    #[tokio::test]
    async fn test_dedup_idempotence_across_windows() {
        let c = candidate(
            "antonio protein overfeeding body composition",
            Some("Jose Antonio"),
            "high protein causes no harm",
        );
        let paraphrase = candidate(
            "protein overfeeding resistance trained effects",
            Some("Jose Antonio"),
            "eating far more protein than needed did not hurt",
        );
        let extractor = ScriptedExtractor::new(vec![
            ExtractionOutput {
                claims: vec![c],
                pending: None,
            },
            ExtractionOutput {
                claims: vec![paraphrase],
                pending: None,
            },
        ]);
        let mut live = LiveExtractor::new(Box::new(extractor));
        live.start_session("vid1");

        let first = live.process_chunk("protein talk part one").await.unwrap();
        assert_eq!(first.len(), 1);
        let second = live.process_chunk("protein talk part two").await.unwrap();
        assert!(second.is_empty());
        assert_eq!(live.all_claims().len(), 1);
        assert_eq!(live.session_stats().duplicates_skipped, 1);
    }

    #[tokio::test]
    async fn test_sponsor_chunk_never_buffered_or_extracted() {
        let extractor = ScriptedExtractor::new(vec![
            ExtractionOutput::default(),
            ExtractionOutput::default(),
        ]);
        let mut live = LiveExtractor::new(Box::new(extractor));
        live.start_session("vid1");

        live.process_chunk("creatine is interesting").await.unwrap();
        let accepted = live.process_chunk("USE CODE fitness10 at checkout").await.unwrap();
        assert!(accepted.is_empty());
        live.process_chunk("back to the science").await.unwrap();

        let state = live.session.as_ref().unwrap();
        // Sponsor text never entered the rolling window
        assert_eq!(
            state.buffer.window_text(),
            "creatine is interesting back to the science"
        );
        assert_eq!(state.stats.sponsor_chunks_skipped, 1);
    }

    #[tokio::test]
    async fn test_pending_carry_over_passed_to_next_call() {
        let pending = PendingClaim {
            partial_text: "a 2021 study by Dr.".to_string(),
            status: PendingStatus::TruncatedEnd,
            has_attribution: true,
            has_finding: false,
            missing: "the finding itself".to_string(),
        };
        let extractor = ScriptedExtractor::new(vec![
            ExtractionOutput {
                claims: vec![],
                pending: Some(pending.clone()),
            },
            ExtractionOutput {
                claims: vec![candidate(
                    "creatine cognition older adults",
                    Some("Dr. Candow"),
                    "creatine improves cognition in older adults",
                )],
                pending: None,
            },
        ]);
        let mut live = LiveExtractor::new(Box::new(extractor));
        live.start_session("vid1");

        live.process_chunk("a 2021 study by Dr.").await.unwrap();
        let accepted = live.process_chunk("Candow found creatine helps").await.unwrap();

        let claim = &accepted[0];
        // The completed claim's detection reaches back to the truncated window
        assert_eq!(claim.detection.window_first_seen, 1);
        assert_eq!(claim.detection.window_completed, 2);
        assert_eq!(claim.detection.latency_windows, 1);
        assert_eq!(claim.author_normalized.as_deref(), Some("Darren Candow"));
        assert!(!live.session_stats().pending_active);
    }

    #[tokio::test]
    async fn test_pending_object_forwarded_unchanged() {
        let pending = PendingClaim {
            partial_text: "researchers at McMaster".to_string(),
            status: PendingStatus::TruncatedEnd,
            has_attribution: true,
            has_finding: false,
            missing: "finding".to_string(),
        };
        let scripted = ScriptedExtractor::new(vec![
            ExtractionOutput {
                claims: vec![],
                pending: Some(pending.clone()),
            },
            ExtractionOutput::default(),
        ]);
        let call_log = Arc::clone(&scripted.calls);
        let mut live = LiveExtractor::new(Box::new(scripted));
        live.start_session("vid1");

        live.process_chunk("researchers at McMaster").await.unwrap();
        live.process_chunk("found that protein timing").await.unwrap();

        let calls = call_log.lock().unwrap();
        let forwarded = calls[1].1.as_ref().expect("pending forwarded");
        assert_eq!(forwarded.partial_text, pending.partial_text);
        assert_eq!(forwarded.status, pending.status);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_soft_and_keeps_pending() {
        let pending = PendingClaim {
            partial_text: "a study by".to_string(),
            status: PendingStatus::TruncatedEnd,
            has_attribution: false,
            has_finding: false,
            missing: "everything".to_string(),
        };
        let extractor = ScriptedExtractor::new(vec![ExtractionOutput {
            claims: vec![],
            pending: Some(pending),
        }]);
        let mut live = LiveExtractor::new(Box::new(extractor));
        live.start_session("vid1");

        live.process_chunk("a study by").await.unwrap();
        // Script exhausted: the extractor now errors, the session continues
        let accepted = live.process_chunk("more transcript").await.unwrap();
        assert!(accepted.is_empty());
        let stats = live.session_stats();
        assert_eq!(stats.extraction_failures, 1);
        assert!(stats.pending_active);
        assert_eq!(stats.windows_processed, 2);
    }

    #[tokio::test]
    async fn test_claim_id_and_timestamps() {
        let extractor = ScriptedExtractor::new(vec![ExtractionOutput {
            claims: vec![candidate("creatine loading phase", None, "loading is optional")],
            pending: None,
        }]);
        let mut live = LiveExtractor::new(Box::new(extractor));
        live.start_session("vid42");

        let accepted = live.process_chunk("creatine loading talk").await.unwrap();
        let claim = &accepted[0];
        assert!(claim.claim_id.starts_with("vid42_live_1_0_"));
        assert_eq!(claim.start_timestamp, "0:00");
        assert_eq!(claim.end_timestamp, "0:10");
    }

    #[tokio::test]
    async fn test_claims_from_same_window_get_distinct_ids() {
        let extractor = ScriptedExtractor::new(vec![ExtractionOutput {
            claims: vec![
                candidate(
                    "creatine loading phase duration",
                    None,
                    "loading is optional",
                ),
                candidate(
                    "creatine brain cognition dose",
                    None,
                    "higher doses may help cognition",
                ),
            ],
            pending: None,
        }]);
        let mut live = LiveExtractor::new(Box::new(extractor));
        live.start_session("vid1");

        let accepted = live.process_chunk("creatine segment").await.unwrap();
        assert_eq!(accepted.len(), 2);
        assert_ne!(accepted[0].claim_id, accepted[1].claim_id);
        assert!(accepted[0].claim_id.starts_with("vid1_live_1_0_"));
        assert!(accepted[1].claim_id.starts_with("vid1_live_1_1_"));
    }

    #[test]
    fn test_sponsor_markers_case_insensitive() {
        assert!(is_sponsor_content("Use CODE save20"));
        assert!(is_sponsor_content("this video is brought to you by"));
        assert!(!is_sponsor_content("creatine monohydrate research"));
    }
}
