//! Source Module
//!
//! Per-attribute entry point over the shared option cache.

mod attribute;

pub use attribute::AttributeOptionSource;
