use chrono::Datelike;

use crate::models::{AcceptedClaim, Document, MatchQuality, MatchScore, ScoredDocument};

/// Function words excluded from keyword matching (the length filter already
/// removes anything of 3 characters or fewer).
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "because", "been", "before", "being", "below",
    "between", "both", "could", "does", "doing", "down", "during", "each", "from", "further",
    "have", "having", "into", "itself", "just", "more", "most", "only", "other", "over", "same",
    "should", "some", "such", "than", "that", "their", "theirs", "them", "then", "there", "these",
    "they", "this", "those", "through", "under", "until", "very", "were", "what", "when", "where",
    "which", "while", "will", "with", "would", "your",
];

/// Weights and cutoffs for match scoring.
///
/// Defaults are empirically chosen; exposed as configuration rather than
/// re-derived. `current_year` is injectable so recency scoring is
/// deterministic in tests.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Weights (author, topic, year, abstract) when the claim names an author
    pub authored_weights: [f64; 4],
    /// Weights when no author was mentioned
    pub anonymous_weights: [f64; 4],
    pub strong_cutoff: f64,
    pub moderate_cutoff: f64,
    pub weak_cutoff: f64,
    pub current_year: i32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            authored_weights: [0.4, 0.3, 0.1, 0.2],
            anonymous_weights: [0.0, 0.5, 0.1, 0.4],
            strong_cutoff: 0.7,
            moderate_cutoff: 0.5,
            weak_cutoff: 0.3,
            current_year: chrono::Utc::now().year(),
        }
    }
}

/// Scores candidate source documents against a claim along author, topic,
/// recency, and abstract dimensions.
#[derive(Debug, Clone, Default)]
pub struct MatchScorer {
    config: ScorerConfig,
}

impl MatchScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, document: &Document, claim: &AcceptedClaim) -> ScoredDocument {
        let author_score = self.author_score(document, claim);
        let topic_score = self.topic_score(document, claim);
        let year_score = self.year_score(document);
        let abstract_score = self.abstract_score(document, claim);

        let weights = if claim.author_normalized.is_some() {
            self.config.authored_weights
        } else {
            self.config.anonymous_weights
        };
        let total_score = weights[0] * author_score
            + weights[1] * topic_score
            + weights[2] * year_score
            + weights[3] * abstract_score;

        let quality = self.classify(claim, author_score, total_score);

        ScoredDocument {
            document: document.clone(),
            score: MatchScore {
                author_score,
                topic_score,
                year_score,
                abstract_score,
                total_score,
                quality,
            },
        }
    }

    /// Score and sort documents, best first (stable on ties)
    pub fn rank_papers(&self, documents: &[Document], claim: &AcceptedClaim) -> Vec<ScoredDocument> {
        let mut scored: Vec<ScoredDocument> =
            documents.iter().map(|d| self.score(d, claim)).collect();
        scored.sort_by(|a, b| {
            b.score
                .total_score
                .partial_cmp(&a.score.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    fn author_score(&self, document: &Document, claim: &AcceptedClaim) -> f64 {
        let Some(full_name) = claim.author_normalized.as_deref() else {
            return 0.0;
        };
        let full_name = full_name.to_lowercase();
        let surname = claim.author_surname().unwrap_or_default();
        let variants: Vec<String> = claim
            .author_variants
            .iter()
            .map(|v| v.to_lowercase())
            .collect();

        let mut best: f64 = 0.0;
        for doc_author in &document.authors {
            let doc_author = doc_author.to_lowercase();
            let doc_surname = doc_author.split_whitespace().last().unwrap_or(&doc_author);

            let score = if doc_author.contains(&full_name) || full_name.contains(&doc_author) {
                1.0
            } else if !surname.is_empty() && doc_surname == surname {
                0.9
            } else if variants
                .iter()
                .any(|v| doc_author.contains(v.as_str()) || doc_surname == v.as_str())
            {
                0.8
            } else {
                0.0
            };
            best = best.max(score);
        }
        best
    }

    fn topic_score(&self, document: &Document, claim: &AcceptedClaim) -> f64 {
        let claim_keywords = extract_keywords(&format!(
            "{} {}",
            claim.primary_query, claim.finding_summary
        ));
        if claim_keywords.is_empty() {
            return 0.0;
        }
        let doc_keywords = extract_keywords(&format!(
            "{} {}",
            document.title,
            document.abstract_text.as_deref().unwrap_or("")
        ));

        let overlap = claim_keywords
            .iter()
            .filter(|k| {
                doc_keywords
                    .iter()
                    .any(|d| d.contains(k.as_str()) || k.contains(d.as_str()))
            })
            .count();
        (overlap as f64 / claim_keywords.len() as f64 * 1.2).min(1.0)
    }

    fn year_score(&self, document: &Document) -> f64 {
        let Some(year) = document.year else {
            return 0.5;
        };
        let age = self.config.current_year.saturating_sub(year);
        match age {
            _ if age <= 5 => 1.0,
            _ if age <= 10 => 0.9,
            _ if age <= 20 => 0.7,
            _ if age <= 30 => 0.5,
            _ => 0.3,
        }
    }

    fn abstract_score(&self, document: &Document, claim: &AcceptedClaim) -> f64 {
        let Some(abstract_text) = document
            .abstract_text
            .as_deref()
            .filter(|a| !a.trim().is_empty())
        else {
            return 0.3;
        };
        let keywords = extract_keywords(&claim.finding_summary);
        if keywords.is_empty() {
            return 0.3;
        }
        let abstract_lower = abstract_text.to_lowercase();
        let hits = keywords
            .iter()
            .filter(|k| abstract_lower.contains(k.as_str()))
            .count();
        (hits as f64 / keywords.len() as f64).min(1.0)
    }

    fn classify(&self, claim: &AcceptedClaim, author_score: f64, total_score: f64) -> MatchQuality {
        // A topically plausible document by the wrong author must never rank
        // above weak.
        if claim.author_normalized.is_some()
            && author_score < 0.5
            && total_score > self.config.weak_cutoff
        {
            return MatchQuality::Weak;
        }
        if total_score >= self.config.strong_cutoff {
            MatchQuality::Strong
        } else if total_score >= self.config.moderate_cutoff {
            MatchQuality::Moderate
        } else if total_score >= self.config.weak_cutoff {
            MatchQuality::Weak
        } else {
            MatchQuality::None
        }
    }
}

/// Keywords: lower-cased, punctuation stripped, stopwords dropped, length > 3,
/// deduplicated in first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in text.to_lowercase().split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if cleaned.len() > 3
            && !STOPWORDS.contains(&cleaned.as_str())
            && !keywords.contains(&cleaned)
        {
            keywords.push(cleaned);
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, DetectionRecord};

    fn claim(author: Option<&str>, query: &str, finding: &str) -> AcceptedClaim {
        AcceptedClaim {
            claim_id: "s_live_1_0".to_string(),
            segment_text: String::new(),
            finding_summary: finding.to_string(),
            confidence: Confidence::High,
            author_mentioned: author.map(String::from),
            author_normalized: author.map(String::from),
            author_variants: vec![],
            institution_mentioned: None,
            primary_query: query.to_string(),
            fallback_queries: vec![],
            detection: DetectionRecord {
                window_first_seen: 1,
                window_completed: 1,
                latency_windows: 0,
            },
            start_timestamp: "0:00".to_string(),
            end_timestamp: "0:10".to_string(),
        }
    }

    fn document(title: &str, authors: &[&str], year: Option<i32>, abstract_text: Option<&str>) -> Document {
        Document {
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            year,
            venue: None,
            abstract_text: abstract_text.map(String::from),
            url: "https://example.org".to_string(),
            doi: None,
            citation_count: None,
            source: "openalex".to_string(),
        }
    }

    fn scorer() -> MatchScorer {
        MatchScorer::new(ScorerConfig {
            current_year: 2026,
            ..Default::default()
        })
    }

    #[test]
    fn test_author_full_name_match_beats_no_overlap() {
        let claim = claim(
            Some("Darren Candow"),
            "creatine cognition",
            "creatine improves cognition",
        );
        let exact = document(
            "Creatine and cognition",
            &["Darren Candow", "Someone Else"],
            Some(2022),
            Some("Creatine supplementation improves cognition."),
        );
        let unrelated = document(
            "Creatine and cognition",
            &["Alex Smith"],
            Some(2022),
            Some("Creatine supplementation improves cognition."),
        );
        let scorer = scorer();
        let exact = scorer.score(&exact, &claim);
        let unrelated = scorer.score(&unrelated, &claim);
        assert_eq!(exact.score.author_score, 1.0);
        assert_eq!(unrelated.score.author_score, 0.0);
        assert!(exact.score.total_score > unrelated.score.total_score);
    }

    #[test]
    fn test_author_surname_and_variant_tiers() {
        let mut c = claim(
            Some("Darren Candow"),
            "creatine cognition",
            "creatine improves cognition",
        );
        c.author_variants = vec!["Kandow".to_string()];
        let scorer = scorer();

        let surname_only = document("t", &["D. J. Candow"], None, None);
        assert_eq!(scorer.score(&surname_only, &c).score.author_score, 0.9);

        let variant = document("t", &["Pat Kandow"], None, None);
        assert_eq!(scorer.score(&variant, &c).score.author_score, 0.8);
    }

    #[test]
    fn test_year_score_tiers() {
        let scorer = scorer();
        let c = claim(None, "q", "f");
        for (year, expected) in [
            (None, 0.5),
            (Some(2023), 1.0),
            (Some(2017), 0.9),
            (Some(2007), 0.7),
            (Some(1997), 0.5),
            (Some(1990), 0.3),
        ] {
            let doc = document("t", &[], year, None);
            assert_eq!(scorer.score(&doc, &c).score.year_score, expected, "{year:?}");
        }
    }

    #[test]
    fn test_missing_abstract_floor() {
        let scorer = scorer();
        let c = claim(None, "creatine cognition", "creatine improves cognition");
        let doc = document("Creatine and cognition", &[], Some(2024), None);
        assert_eq!(scorer.score(&doc, &c).score.abstract_score, 0.3);

        // A whitespace-only abstract is absent, same as has_abstract() says.
        let blank = document("Creatine and cognition", &[], Some(2024), Some("  \n"));
        assert!(!blank.has_abstract());
        assert_eq!(scorer.score(&blank, &c).score.abstract_score, 0.3);
    }

    #[test]
    fn test_wrong_author_guard_forces_weak() {
        let c = claim(
            Some("Darren Candow"),
            "creatine cognition memory supplementation",
            "creatine supplementation improves memory and cognition",
        );
        // Perfect topic and abstract overlap, recent, but the wrong author
        let doc = document(
            "Creatine supplementation improves memory and cognition",
            &["Alex Smith"],
            Some(2024),
            Some("creatine supplementation improves memory cognition"),
        );
        let scored = scorer().score(&doc, &c);
        assert_eq!(scored.score.author_score, 0.0);
        assert!(scored.score.total_score > 0.3);
        assert_eq!(scored.score.quality, MatchQuality::Weak);
    }

    #[test]
    fn test_quality_thresholds_without_author() {
        let scorer = scorer();
        let c = claim(None, "creatine cognition memory", "creatine improves memory cognition");
        let strong_doc = document(
            "Creatine improves memory and cognition",
            &[],
            Some(2024),
            Some("creatine memory cognition improves"),
        );
        let scored = scorer.score(&strong_doc, &c);
        assert!(scored.score.total_score >= 0.7);
        assert_eq!(scored.score.quality, MatchQuality::Strong);

        let none_doc = document("Soil erosion in the Andes", &[], None, None);
        assert_eq!(scorer.score(&none_doc, &c).score.quality, MatchQuality::None);
    }

    #[test]
    fn test_rank_papers_descending() {
        let scorer = scorer();
        let c = claim(None, "creatine cognition", "creatine improves cognition");
        let good = document(
            "Creatine and cognition",
            &[],
            Some(2024),
            Some("creatine improves cognition"),
        );
        let bad = document("Soil erosion", &[], Some(1980), None);
        let ranked = scorer.rank_papers(&[bad.clone(), good.clone()], &c);
        assert_eq!(ranked[0].document.title, good.title);
        assert!(ranked[0].score.total_score >= ranked[1].score.total_score);
    }

    #[test]
    fn test_extract_keywords_filters() {
        let kws = extract_keywords("The study showed that creatine (5g/day) helps memory!");
        assert!(kws.contains(&"creatine".to_string()));
        assert!(kws.contains(&"memory".to_string()));
        assert!(!kws.contains(&"that".to_string()));
        assert!(!kws.iter().any(|k| k.len() <= 3));
    }
}
