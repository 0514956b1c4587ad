//! Sort Module
//!
//! Ordering queries by an attribute's resolved option label.

mod join;

pub use join::SortJoinBuilder;
