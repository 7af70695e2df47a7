use std::collections::HashSet;

use tracing::debug;

use crate::authors::{strip_honorific, NormalizedAuthor};
use crate::models::CandidateClaim;

/// Thresholds for duplicate detection.
///
/// The defaults are empirically chosen; they are configuration, not constants
/// to re-derive.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Windows after which a record stops being compared against
    pub ttl_windows: u64,
    /// Jaccard similarity above which two queries are the same topic
    pub jaccard_threshold: f64,
    /// Shared significant words required for the author+topic rule
    pub min_shared_topic_words: usize,
    /// Words must be longer than this to count as significant
    pub min_topic_word_len: usize,
    /// How many recent summaries to feed back to the extractor
    pub recent_summary_limit: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl_windows: 10,
            jaccard_threshold: 0.7,
            min_shared_topic_words: 2,
            min_topic_word_len: 3,
            recent_summary_limit: 5,
        }
    }
}

/// One accepted claim's footprint for future duplicate comparisons.
///
/// Exists iff the corresponding claim was emitted in this session.
#[derive(Debug, Clone)]
struct DedupRecord {
    /// Lower-cased, honorific-stripped normalized author, if any
    author: Option<String>,
    query: String,
    finding_hash: String,
    window: u64,
}

/// Summary of a recent claim, fed back into the extraction call as a
/// negative example.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClaimSummary {
    pub window: u64,
    pub author: Option<String>,
    pub topic: String,
}

/// Detects when a candidate claim re-describes an already-accepted one.
///
/// Three independent, cheap, order-insensitive heuristics: same author on an
/// overlapping topic, near-identical queries, and identical finding content.
/// Together they catch the paraphrases that overlapping sliding windows
/// produce and an exact-string check would miss.
#[derive(Debug, Default)]
pub struct Deduplicator {
    config: DedupConfig,
    records: Vec<DedupRecord>,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    /// Check a candidate against all non-expired records, first match wins.
    pub fn is_duplicate(
        &mut self,
        candidate: &CandidateClaim,
        author: &NormalizedAuthor,
        current_window: u64,
    ) -> bool {
        self.expire(current_window);

        let candidate_author = compare_key(author.normalized.as_deref());
        let candidate_hash = finding_hash(&candidate.finding_summary);

        for record in &self.records {
            // Same author, same topic, different words: the dominant pattern
            // from overlapping windows.
            if let (Some(a), Some(b)) = (&candidate_author, &record.author) {
                if a == b
                    && shared_topic_words(&candidate.search_query, &record.query, &self.config)
                        >= self.config.min_shared_topic_words
                {
                    debug!(window = current_window, author = %a, "duplicate: author+topic");
                    return true;
                }
            }

            if jaccard(&candidate.search_query, &record.query) > self.config.jaccard_threshold {
                debug!(window = current_window, "duplicate: query similarity");
                return true;
            }

            if candidate_hash == record.finding_hash {
                debug!(window = current_window, "duplicate: finding hash");
                return true;
            }
        }

        false
    }

    /// Record an accepted candidate so later windows can match against it
    pub fn record(
        &mut self,
        candidate: &CandidateClaim,
        author: &NormalizedAuthor,
        current_window: u64,
    ) {
        self.records.push(DedupRecord {
            author: compare_key(author.normalized.as_deref()),
            query: candidate.search_query.clone(),
            finding_hash: finding_hash(&candidate.finding_summary),
            window: current_window,
        });
    }

    /// Up to N most recent claim summaries, oldest first
    pub fn recent_summaries(&self) -> Vec<ClaimSummary> {
        let skip = self
            .records
            .len()
            .saturating_sub(self.config.recent_summary_limit);
        self.records[skip..]
            .iter()
            .map(|r| ClaimSummary {
                window: r.window,
                author: r.author.clone(),
                topic: r.query.clone(),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn expire(&mut self, current_window: u64) {
        let ttl = self.config.ttl_windows;
        self.records
            .retain(|r| current_window.saturating_sub(r.window) < ttl);
    }
}

/// Normalize an author name for comparison: honorific stripped, lower-cased
fn compare_key(author: Option<&str>) -> Option<String> {
    author.map(|a| strip_honorific(a.trim()).to_lowercase())
}

fn significant_words(text: &str, config: &DedupConfig) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > config.min_topic_word_len)
        .map(|w| w.to_string())
        .collect()
}

fn shared_topic_words(a: &str, b: &str, config: &DedupConfig) -> usize {
    let words_a = significant_words(a, config);
    let words_b = significant_words(b, config);
    words_a.intersection(&words_b).count()
}

/// Jaccard similarity of whitespace-tokenized, lower-cased word sets
fn jaccard(a: &str, b: &str) -> f64 {
    let set_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let set_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    set_a.intersection(&set_b).count() as f64 / union as f64
}

/// Order-insensitive content hash of a finding summary: lower-cased
/// significant words, sorted, first 8, concatenated.
pub fn finding_hash(summary: &str) -> String {
    let cleaned: String = summary
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut words: Vec<&str> = cleaned.split_whitespace().filter(|w| w.len() > 3).collect();
    words.sort_unstable();
    words.truncate(8);
    words.concat()
}
