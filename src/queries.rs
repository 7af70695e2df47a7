use crate::authors::NormalizedAuthor;
use crate::models::CandidateClaim;

/// Most fallback queries attached to a claim
const MAX_FALLBACKS: usize = 3;
/// Author spelling variants tried as fallbacks
const MAX_VARIANT_FALLBACKS: usize = 2;

/// Primary search query plus up to 3 fallbacks for one claim
#[derive(Debug, Clone)]
pub struct ClaimQueries {
    pub primary: String,
    pub fallbacks: Vec<String>,
}

/// Build the literature search queries for a candidate claim.
///
/// With a normalized author the primary query anchors on the surname;
/// fallbacks cover alternate surname spellings, the institution, and a
/// topic-only form for when author-anchored searches come up empty.
pub fn build_queries(candidate: &CandidateClaim, author: &NormalizedAuthor) -> ClaimQueries {
    let surname = author.surname();

    let primary = match &surname {
        Some(surname) => {
            let head: Vec<&str> = candidate.search_query.split_whitespace().take(3).collect();
            format!("{} {}", surname, head.join(" "))
        }
        None => candidate.search_query.clone(),
    };

    let mut fallbacks: Vec<String> = Vec::new();

    // Alternate surname spellings substituted into the query
    if let Some(surname) = &surname {
        for variant in author
            .variants
            .iter()
            .filter(|v| v.to_lowercase() != *surname)
            .take(MAX_VARIANT_FALLBACKS)
        {
            if let Some(replaced) = replace_token(&candidate.search_query, surname, variant) {
                if !fallbacks.contains(&replaced) {
                    fallbacks.push(replaced);
                }
            }
        }
    }

    // Institution plus topic words not already naming the author
    if let Some(institution) = candidate
        .institution_mentioned
        .as_deref()
        .filter(|i| !i.trim().is_empty())
    {
        let topic: Vec<&str> = candidate
            .search_query
            .split_whitespace()
            .filter(|w| match &surname {
                Some(surname) => !w.to_lowercase().contains(surname),
                None => true,
            })
            .take(2)
            .collect();
        if !topic.is_empty() {
            fallbacks.push(format!("{} {}", institution, topic.join(" ")));
        }
    }

    // Topic-only form, kept only when it actually differs from the query
    let topic_only: Vec<&str> = candidate
        .search_query
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .take(4)
        .collect();
    let topic_only = topic_only.join(" ");
    if !topic_only.is_empty() && topic_only != candidate.search_query {
        fallbacks.push(topic_only);
    }

    fallbacks.truncate(MAX_FALLBACKS);

    ClaimQueries { primary, fallbacks }
}

/// Replace a whole token case-insensitively; None when the token never occurs
fn replace_token(text: &str, target: &str, replacement: &str) -> Option<String> {
    let target = target.to_lowercase();
    let mut replaced = false;
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| {
            if w.to_lowercase() == target {
                replaced = true;
                replacement
            } else {
                w
            }
        })
        .collect();
    replaced.then(|| words.join(" "))
}
