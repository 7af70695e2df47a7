pub mod openalex;
pub mod serper;

use async_trait::async_trait;

use crate::models::Document;

pub use openalex::OpenAlexClient;
pub use serper::SerperClient;

/// External document-search collaborator. Zero results is a valid,
/// non-error response.
#[async_trait]
pub trait DocumentSearcher: Send + Sync {
    /// Tag recorded on documents and search attempts (e.g. "openalex", "web")
    fn source(&self) -> &str;

    async fn search(&self, query: &str) -> anyhow::Result<Vec<Document>>;
}
