pub mod authors;
pub mod dedup;
pub mod io;
pub mod llm;
pub mod models;
pub mod queries;
pub mod scoring;
pub mod search;
pub mod session;
pub mod store;
pub mod verify;
pub mod window;

pub use authors::{AuthorNormalizer, NormalizedAuthor, PhoneticVariants, VariantStrategy};
pub use dedup::{ClaimSummary, DedupConfig, Deduplicator};
pub use llm::{AnthropicClient, AnthropicConfig, AnthropicExtractor, AnthropicVerifier};
pub use models::{
    AcceptedClaim, CandidateClaim, Confidence, Document, MatchQuality, PendingClaim,
    ScoredDocument, SearchAttempt, VerificationOutcome, Verdict, VerifiedClaim,
};
pub use scoring::{MatchScorer, ScorerConfig};
pub use search::{DocumentSearcher, OpenAlexClient, SerperClient};
pub use session::{ClaimExtractor, ExtractionOutput, LiveExtractor, SessionError, SessionStats};
pub use store::{ClaimStore, MemoryStore};
pub use verify::{ClaimVerifier, Verifier, VerifyConfig};
pub use window::WindowBuffer;
