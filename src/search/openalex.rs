use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::DocumentSearcher;
use crate::models::Document;

const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// Client for the OpenAlex works index (free, no API key).
///
/// Tried before web search because results carry structured author, year, and
/// abstract data the match scorer needs.
pub struct OpenAlexClient {
    client: Client,
    base_url: String,
    per_page: usize,
}

impl Default for OpenAlexClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL.to_string(), 10)
    }
}

impl OpenAlexClient {
    pub fn new(base_url: String, per_page: usize) -> Self {
        Self {
            client: Client::new(),
            base_url,
            per_page,
        }
    }
}

#[async_trait]
impl DocumentSearcher for OpenAlexClient {
    fn source(&self) -> &str {
        "openalex"
    }

    async fn search(&self, query: &str) -> Result<Vec<Document>> {
        let url = format!("{}/works", self.base_url);
        let per_page = self.per_page.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("search", query), ("per-page", per_page.as_str())])
            .send()
            .await
            .context("Failed to send request to OpenAlex")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAlex API error: {} - {}", status, body);
        }

        let response: WorksResponse = response
            .json()
            .await
            .context("Failed to parse OpenAlex response")?;

        Ok(response
            .results
            .into_iter()
            .map(|work| work.into_document())
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    publication_year: Option<i32>,
    #[serde(default)]
    authorships: Vec<Authorship>,
    #[serde(default)]
    primary_location: Option<Location>,
    #[serde(default)]
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    cited_by_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Authorship {
    #[serde(default)]
    author: Author,
}

#[derive(Debug, Default, Deserialize)]
struct Author {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(default)]
    source: Option<LocationSource>,
}

#[derive(Debug, Deserialize)]
struct LocationSource {
    #[serde(default)]
    display_name: String,
}

impl Work {
    fn into_document(self) -> Document {
        let abstract_text = self.abstract_inverted_index.as_ref().map(reconstruct_abstract);
        Document {
            title: self.display_name,
            authors: self
                .authorships
                .into_iter()
                .map(|a| a.author.display_name)
                .filter(|n| !n.is_empty())
                .collect(),
            year: self.publication_year,
            venue: self
                .primary_location
                .and_then(|l| l.source)
                .map(|s| s.display_name)
                .filter(|v| !v.is_empty()),
            abstract_text: abstract_text.filter(|a| !a.is_empty()),
            url: self.id,
            doi: self.doi,
            citation_count: self.cited_by_count,
            source: "openalex".to_string(),
        }
    }
}

/// OpenAlex ships abstracts as word -> positions; invert back to text
fn reconstruct_abstract(inverted: &HashMap<String, Vec<usize>>) -> String {
    let mut positions: Vec<(usize, &str)> = inverted
        .iter()
        .flat_map(|(word, indices)| indices.iter().map(move |&i| (i, word.as_str())))
        .collect();
    positions.sort_unstable_by_key(|(i, _)| *i);
    positions
        .into_iter()
        .map(|(_, word)| word)
        .collect::<Vec<_>>()
        .join(" ")
}
