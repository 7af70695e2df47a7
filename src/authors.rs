use serde::{Deserialize, Serialize};

/// Canonical identity resolved from a mentioned author name.
///
/// `normalized` is `None` only when no author was mentioned at all; for an
/// unrecognized name it holds the mentioned string verbatim and `variants`
/// holds heuristic spellings of the surname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedAuthor {
    pub normalized: Option<String>,
    pub variants: Vec<String>,
}

impl NormalizedAuthor {
    pub fn none() -> Self {
        Self {
            normalized: None,
            variants: vec![],
        }
    }

    /// Lower-cased surname of the normalized name, if any
    pub fn surname(&self) -> Option<String> {
        self.normalized
            .as_deref()
            .map(strip_honorific)
            .and_then(|name| {
                name.split_whitespace()
                    .last()
                    .map(|s| s.to_lowercase())
            })
    }
}

/// Strategy for generating alternate spellings of an unknown surname.
///
/// Deliberately approximate: false positives/negatives only affect fallback
/// query diversity and dedup recall, so implementations can be swapped for a
/// stronger phonetic library without touching callers.
pub trait VariantStrategy: Send + Sync {
    fn variants(&self, surname: &str) -> Vec<String>;
}

/// Known researchers frequently cited in fitness/nutrition videos, keyed by
/// lower-cased surname, with the misspellings we have seen transcribers produce.
const KNOWN_RESEARCHERS: &[(&str, &str, &[&str])] = &[
    ("antonio", "Jose Antonio", &["Antonio", "Antonios"]),
    ("candow", "Darren Candow", &["Kandow", "Candow", "Cando"]),
    ("schoenfeld", "Brad Schoenfeld", &["Schoenfeld", "Shoenfeld", "Schonfeld"]),
    ("phillips", "Stuart Phillips", &["Phillips", "Philips"]),
    ("helms", "Eric Helms", &["Helms", "Helm"]),
    ("norton", "Layne Norton", &["Norton", "Naughton"]),
    ("huberman", "Andrew Huberman", &["Huberman", "Hubermann"]),
    ("attia", "Peter Attia", &["Attia", "Atia"]),
    ("galpin", "Andy Galpin", &["Galpin", "Galpen"]),
    ("israetel", "Mike Israetel", &["Israetel", "Isratel", "Israetal"]),
    ("nippard", "Jeff Nippard", &["Nippard", "Nipard"]),
    ("patrick", "Rhonda Patrick", &["Patrick", "Patric"]),
];

/// Maps mentioned author names to canonical identities plus spelling variants
pub struct AuthorNormalizer {
    strategy: Box<dyn VariantStrategy>,
}

impl Default for AuthorNormalizer {
    fn default() -> Self {
        Self {
            strategy: Box::new(PhoneticVariants),
        }
    }
}

impl AuthorNormalizer {
    pub fn new(strategy: Box<dyn VariantStrategy>) -> Self {
        Self { strategy }
    }

    /// Resolve a mentioned name against the registry, falling back to
    /// phonetic variants of the surname for unknown names.
    pub fn normalize(&self, mentioned: Option<&str>) -> NormalizedAuthor {
        let Some(raw) = mentioned else {
            return NormalizedAuthor::none();
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return NormalizedAuthor::none();
        }

        let stripped = strip_honorific(raw);
        let surname = stripped
            .split_whitespace()
            .last()
            .unwrap_or(stripped)
            .to_lowercase();

        for (key, canonical, variants) in KNOWN_RESEARCHERS {
            let known = surname == *key
                || variants.iter().any(|v| v.to_lowercase() == surname);
            if known {
                return NormalizedAuthor {
                    normalized: Some((*canonical).to_string()),
                    variants: variants.iter().map(|v| (*v).to_string()).collect(),
                };
            }
        }

        NormalizedAuthor {
            normalized: Some(raw.to_string()),
            variants: self.strategy.variants(&surname),
        }
    }
}

/// Drop a leading "Dr." / "Professor" honorific, case-insensitively
pub fn strip_honorific(name: &str) -> &str {
    let lower = name.to_lowercase();
    for prefix in ["dr.", "dr ", "professor ", "professor."] {
        if lower.starts_with(prefix) {
            return name[prefix.len()..].trim_start();
        }
    }
    name
}

/// Default variant strategy: a handful of common transcription confusions
/// applied independently to the surname.
pub struct PhoneticVariants;

impl VariantStrategy for PhoneticVariants {
    fn variants(&self, surname: &str) -> Vec<String> {
        if surname.is_empty() {
            return vec![];
        }
        let mut out: Vec<String> = Vec::new();
        let mut push = |candidate: String| {
            if candidate != surname && !out.contains(&candidate) {
                out.push(candidate);
            }
        };

        // K/C prefix swap
        if let Some(rest) = surname.strip_prefix('k').or_else(|| surname.strip_prefix('K')) {
            push(format!("c{rest}"));
        } else if let Some(rest) = surname.strip_prefix('c').or_else(|| surname.strip_prefix('C')) {
            push(format!("k{rest}"));
        }

        // Collapse doubled letters
        let mut collapsed = String::with_capacity(surname.len());
        let mut prev = None;
        for ch in surname.chars() {
            if prev != Some(ch) {
                collapsed.push(ch);
            }
            prev = Some(ch);
        }
        push(collapsed);

        // Suffix confusions
        for (from, to) in [
            ("er", "or"),
            ("or", "er"),
            ("mann", "man"),
            ("man", "mann"),
            ("son", "sen"),
            ("sen", "son"),
        ] {
            if let Some(stem) = surname.strip_suffix(from) {
                push(format!("{stem}{to}"));
            }
        }

        out
    }
}
