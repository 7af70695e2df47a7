use serde::{Deserialize, Serialize};

/// Extractor confidence in a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A raw claim returned by the extraction call for one window.
///
/// Ephemeral: exists only within a single window-processing step, until the
/// deduplicator either discards it or promotes it to an [`AcceptedClaim`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateClaim {
    /// Transcript excerpt the claim was extracted from
    pub segment_text: String,
    /// Short search query suggested by the extractor
    pub search_query: String,
    pub confidence: Confidence,
    /// Person the speaker attributed the finding to, if any
    #[serde(default)]
    pub author_mentioned: Option<String>,
    /// Institution the speaker attributed the finding to, if any
    #[serde(default)]
    pub institution_mentioned: Option<String>,
    /// One-sentence summary of the factual finding
    pub finding_summary: String,
}

/// Which side of the claim was cut off at the window boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    TruncatedStart,
    TruncatedEnd,
}

/// A claim detected as incomplete at a window boundary, carried forward so the
/// next window can complete it. At most one per session at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingClaim {
    /// The partial segment text seen so far
    pub partial_text: String,
    pub status: PendingStatus,
    /// Whether an author/institution attribution was already heard
    pub has_attribution: bool,
    /// Whether the actual finding was already heard
    pub has_finding: bool,
    /// Free-text note on what is still missing
    pub missing: String,
}

/// When a claim was first seen vs. completed, in window units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub window_first_seen: u64,
    pub window_completed: u64,
    pub latency_windows: u64,
}

/// A deduplicated claim accepted into the session's claim list.
///
/// Created once, immutable thereafter; never deleted within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedClaim {
    /// Stable id: `{session_id}_live_{window_id}_{index_in_window}_{wall_clock_millis}`
    pub claim_id: String,
    pub segment_text: String,
    pub finding_summary: String,
    pub confidence: Confidence,
    pub author_mentioned: Option<String>,
    /// Canonical author identity from the registry, or the mentioned string
    /// verbatim when no registry entry matched
    pub author_normalized: Option<String>,
    /// Known spelling/phonetic variants of the author surname
    pub author_variants: Vec<String>,
    pub institution_mentioned: Option<String>,
    /// Query used first when searching the literature
    pub primary_query: String,
    /// Up to 3 alternates tried when the primary under-performs
    pub fallback_queries: Vec<String>,
    pub detection: DetectionRecord,
    /// Approximate position in the video, `M:SS`
    pub start_timestamp: String,
    pub end_timestamp: String,
}

impl AcceptedClaim {
    /// Lower-cased surname of the normalized author, if any
    pub fn author_surname(&self) -> Option<String> {
        self.author_normalized
            .as_deref()
            .and_then(|name| name.split_whitespace().last())
            .map(|s| s.to_lowercase())
    }
}
