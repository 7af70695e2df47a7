use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{AcceptedClaim, VerifiedClaim};

/// Words per chunk when replaying a transcript file as a live stream.
/// Roughly 10 seconds of conversational speech.
pub const DEFAULT_CHUNK_WORDS: usize = 25;

/// Load a plain-text transcript file
pub fn load_transcript(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read transcript {path:?}"))
}

/// Split a transcript into fixed-size word chunks, simulating the ~10s
/// fragments a live transcription feed delivers.
pub fn chunk_transcript(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || words_per_chunk == 0 {
        return vec![];
    }
    words
        .chunks(words_per_chunk)
        .map(|chunk| chunk.join(" "))
        .collect()
}

/// Write accepted claims as pretty-printed JSON
pub fn write_claims(path: &Path, claims: &[AcceptedClaim]) -> Result<()> {
    let json = serde_json::to_string_pretty(claims).context("Failed to serialize claims")?;
    fs::write(path, json).with_context(|| format!("Failed to write claims to {path:?}"))
}

/// Write verified claims as pretty-printed JSON
pub fn write_verified(path: &Path, verified: &[VerifiedClaim]) -> Result<()> {
    let json = serde_json::to_string_pretty(verified).context("Failed to serialize results")?;
    fs::write(path, json).with_context(|| format!("Failed to write results to {path:?}"))
}

/// Read accepted claims back from JSON
pub fn read_claims(path: &Path) -> Result<Vec<AcceptedClaim>> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read claims {path:?}"))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse claims {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, DetectionRecord};

    #[test]
    fn test_chunk_transcript_splits_on_word_count() {
        let chunks = chunk_transcript("a b c d e f g", 3);
        assert_eq!(chunks, vec!["a b c", "d e f", "g"]);
    }

    #[test]
    fn test_chunk_transcript_empty() {
        assert!(chunk_transcript("   ", 3).is_empty());
        assert!(chunk_transcript("a b", 0).is_empty());
    }

    #[test]
    fn test_claims_round_trip_through_file() {
        let claim = AcceptedClaim {
            claim_id: "vid1_live_3_1700000000000".to_string(),
            segment_text: "Candow found creatine helps memory".to_string(),
            finding_summary: "creatine improves memory".to_string(),
            confidence: Confidence::High,
            author_mentioned: Some("Dr. Candow".to_string()),
            author_normalized: Some("Darren Candow".to_string()),
            author_variants: vec!["Kandow".to_string()],
            institution_mentioned: None,
            primary_query: "candow creatine memory".to_string(),
            fallback_queries: vec![],
            detection: DetectionRecord {
                window_first_seen: 2,
                window_completed: 3,
                latency_windows: 1,
            },
            start_timestamp: "0:00".to_string(),
            end_timestamp: "0:30".to_string(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.json");
        write_claims(&path, std::slice::from_ref(&claim)).unwrap();
        let loaded = read_claims(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].claim_id, claim.claim_id);
        assert_eq!(loaded[0].author_normalized, claim.author_normalized);
    }
}
