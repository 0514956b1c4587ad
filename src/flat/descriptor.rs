//! Column and index descriptors for flat tables.

use std::fmt;

use serde::Serialize;

/// Physical type of a flat column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// DDL integer; the length lives on the descriptor
    Integer,
    /// DDL text; the length lives on the descriptor
    Text,
    /// Legacy `int` definition
    Int,
    /// Legacy `varchar(n)` definition
    Varchar(u32),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => f.write_str("integer"),
            ColumnType::Text => f.write_str("text"),
            ColumnType::Int => f.write_str("int"),
            ColumnType::Varchar(length) => write!(f, "varchar({})", length),
        }
    }
}

/// One flat table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub length: Option<u32>,
    pub unsigned: bool,
    pub nullable: bool,
    pub default: Option<String>,
    pub extra: Option<String>,
    pub comment: Option<String>,
}

impl ColumnDescriptor {
    /// A nullable, signed column with no default.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            length: None,
            unsigned: false,
            nullable: true,
            default: None,
            extra: None,
            comment: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Index,
}

/// One flat table index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub index_type: IndexType,
    pub fields: Vec<String>,
}

impl IndexDescriptor {
    pub fn index(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            index_type: IndexType::Index,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_display() {
        assert_eq!(ColumnType::Int.to_string(), "int");
        assert_eq!(ColumnType::Varchar(255).to_string(), "varchar(255)");
        assert_eq!(ColumnType::Text.to_string(), "text");
    }

    #[test]
    fn test_column_defaults() {
        let column = ColumnDescriptor::new("color", ColumnType::Integer);
        assert!(column.nullable);
        assert!(!column.unsigned);
        assert!(column.default.is_none());
        assert!(column.extra.is_none());
    }
}
