//! Error types for the option cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Option Error Enum ==
/// Unified error type for option loading, schema generation and sort building.
///
/// A missing option label is not an error; lookups report it through
/// `Option::None` or [`crate::models::OptionText::NotFound`].
#[derive(Error, Debug)]
pub enum OptionError {
    /// The option repository failed to fetch rows for a store
    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),

    /// Attribute metadata or configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The query collaborator rejected a join or ordering instruction
    #[error("Query error: {0}")]
    Query(String),
}

// == Result Type Alias ==
/// Convenience Result type for the option cache.
pub type Result<T> = std::result::Result<T, OptionError>;
