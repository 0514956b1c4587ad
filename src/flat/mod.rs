//! Flat Module
//!
//! Flat table schema fragments for selectable attributes.

mod descriptor;
mod schema;

pub use descriptor::{ColumnDescriptor, ColumnType, IndexDescriptor, IndexType};
pub use schema::{FlatSchema, FlatSchemaGenerator};
