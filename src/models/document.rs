use serde::{Deserialize, Serialize};

/// A retrieved source document (paper, preprint, or web result)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub url: String,
    pub doi: Option<String>,
    pub citation_count: Option<u64>,
    /// Which backend produced this document (e.g. "openalex", "web")
    pub source: String,
}

impl Document {
    pub fn has_abstract(&self) -> bool {
        self.abstract_text
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty())
    }
}

/// Categorical summary of how well a document matches a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Strong,
    Moderate,
    Weak,
    None,
}

/// Per-dimension match scores, all in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScore {
    pub author_score: f64,
    pub topic_score: f64,
    pub year_score: f64,
    pub abstract_score: f64,
    /// Weighted sum of the sub-scores
    pub total_score: f64,
    pub quality: MatchQuality,
}

/// A document together with its match score against one claim.
///
/// Ephemeral: recomputed per verification attempt, never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: MatchScore,
}
