//! EAV Options - option cache for selectable EAV attributes
//!
//! Loads every option of a store once, serves per-attribute option lists
//! and option labels from memory, and derives flat table schema fragments
//! and label-sort joins from attribute metadata.

pub mod cache;
pub mod config;
pub mod error;
pub mod flat;
pub mod models;
pub mod query;
pub mod repository;
pub mod sort;
pub mod source;

pub use cache::{CacheStats, LabelKind, OptionCache};
pub use config::Config;
pub use error::{OptionError, Result};
pub use flat::{FlatSchema, FlatSchemaGenerator};
pub use models::{AttributeMetadata, InputType, OptionItem, OptionText, StoreId};
pub use repository::{OptionCriteria, OptionRepository, PreloadFilter};
pub use sort::SortJoinBuilder;
pub use source::AttributeOptionSource;
