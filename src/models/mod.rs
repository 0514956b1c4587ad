//! Data models shared by the cache, the option source and the generators.

pub mod attribute;
pub mod option;

// Re-export commonly used types
pub use attribute::{AttributeMetadata, InputType};
pub use option::{AttributeId, OptionId, OptionItem, OptionRow, OptionText, StoreId};
