use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::DocumentSearcher;
use crate::models::Document;

const SERPER_URL: &str = "https://google.serper.dev/search";

/// Web-search fallback via the Serper.dev API.
///
/// Results carry no author/year metadata, so they score low on those
/// dimensions and only win when the academic index finds nothing topical.
pub struct SerperClient {
    client: Client,
    api_key: String,
    num_results: usize,
}

impl SerperClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            num_results: 10,
        }
    }

    /// Create from the SERPER_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SERPER_API_KEY")
            .context("SERPER_API_KEY environment variable not set")?;
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl DocumentSearcher for SerperClient {
    fn source(&self) -> &str {
        "web"
    }

    async fn search(&self, query: &str) -> Result<Vec<Document>> {
        let request = SerperRequest {
            q: query.to_string(),
            num: self.num_results,
        };
        let response = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Serper")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Serper API error: {} - {}", status, body);
        }

        let response: SerperResponse = response
            .json()
            .await
            .context("Failed to parse Serper response")?;

        Ok(response
            .organic
            .into_iter()
            .map(|item| Document {
                title: item.title,
                authors: vec![],
                year: None,
                venue: None,
                abstract_text: Some(item.snippet).filter(|s| !s.is_empty()),
                url: item.link,
                doi: None,
                citation_count: None,
                source: "web".to_string(),
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct SerperRequest {
    q: String,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperItem>,
}

#[derive(Debug, Deserialize)]
struct SerperItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses_with_missing_fields() {
        let json = r#"{"organic": [{"title": "Creatine study", "link": "https://x.y"}]}"#;
        let parsed: SerperResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.organic.len(), 1);
        assert_eq!(parsed.organic[0].snippet, "");
    }
}
