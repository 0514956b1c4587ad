//! Query Module
//!
//! The generic select abstraction consumed by the sort builder and the
//! option repository. Joins and conditions are structured values; no SQL
//! text is assembled here.

mod expr;
mod plan;
mod staged;

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::models::StoreId;

// Re-export public types
pub use expr::{Condition, Expr, Value};
pub use plan::{Order, QueryPlan};
pub use staged::{StagedChanges, StagedQuery};

/// Sort direction for ordering instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// A left join against `table` aliased as `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    pub alias: String,
    pub table: String,
    pub on: Condition,
}

impl Join {
    pub fn new(alias: impl Into<String>, table: impl Into<String>, on: Condition) -> Self {
        Self {
            alias: alias.into(),
            table: table.into(),
            on,
        }
    }
}

/// A mutable select the sort builder and repository emit instructions into.
pub trait SelectQuery {
    /// Store scope the query targets.
    fn store_id(&self) -> StoreId;

    /// Alias of the entity table (`e` by convention).
    fn main_alias(&self) -> &str;

    /// True if `alias` names the main table or a joined table.
    fn has_table(&self, alias: &str) -> bool;

    /// True if a selected column is defined under `alias`.
    fn has_column(&self, alias: &str) -> bool;

    fn add_left_join(&mut self, join: Join) -> Result<()>;

    /// Adds (or replaces) a selected column under `alias`.
    fn add_column(&mut self, alias: &str, expr: Expr) -> Result<()>;

    fn add_order(&mut self, expr: Expr, direction: SortDirection) -> Result<()>;
}
