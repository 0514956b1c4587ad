//! Cache Module
//!
//! Store-scoped option cache with per-attribute option lists and an
//! option-id to label index.

mod key;
mod stats;
mod store;


// Re-export public types
pub use key::{CacheKey, LabelKind, Subject};
pub use stats::CacheStats;
pub use store::OptionCache;
