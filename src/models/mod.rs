pub mod claim;
pub mod document;
pub mod verification;

pub use claim::*;
pub use document::*;
pub use verification::*;
