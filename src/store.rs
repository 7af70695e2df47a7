use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::AcceptedClaim;

/// Persistence collaborator with upsert-by-id semantics.
///
/// Writing the same claim_id twice must be idempotent: mutable fields take the
/// last write, but the id and segment text never change after creation.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    async fn upsert(&self, claim: &AcceptedClaim) -> anyhow::Result<()>;
}

/// In-memory store for the CLI and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    claims: Mutex<HashMap<String, AcceptedClaim>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored claims, ordered by claim_id
    pub async fn all(&self) -> Vec<AcceptedClaim> {
        let claims = self.claims.lock().await;
        let mut all: Vec<AcceptedClaim> = claims.values().cloned().collect();
        all.sort_by(|a, b| a.claim_id.cmp(&b.claim_id));
        all
    }

    pub async fn len(&self) -> usize {
        self.claims.lock().await.len()
    }
}

#[async_trait]
impl ClaimStore for MemoryStore {
    async fn upsert(&self, claim: &AcceptedClaim) -> anyhow::Result<()> {
        let mut claims = self.claims.lock().await;
        match claims.get_mut(&claim.claim_id) {
            Some(existing) => {
                let segment = existing.segment_text.clone();
                *existing = claim.clone();
                existing.segment_text = segment;
            }
            None => {
                claims.insert(claim.claim_id.clone(), claim.clone());
            }
        }
        Ok(())
    }
}
