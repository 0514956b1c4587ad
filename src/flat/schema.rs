//! Flat Schema Generator
//!
//! Derives the denormalized flat table columns and indexes of a selectable
//! attribute from its code, input type and sortability.

use serde::Serialize;

use crate::config::Config;
use crate::error::{OptionError, Result};
use crate::flat::{ColumnDescriptor, ColumnType, IndexDescriptor};
use crate::models::AttributeMetadata;

/// Columns and indexes of one attribute in a flat table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatSchema {
    pub columns: Vec<ColumnDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
}

impl FlatSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

// == Flat Schema Generator ==
/// Stateless generator of flat table descriptors.
///
/// The primary column is named after the attribute code and holds the
/// option id (or comma-joined ids for multiselects). Single-selects also
/// get a `<code>_value` text column holding the resolved label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatSchemaGenerator {
    text_length: u32,
    db_compatible_mode: bool,
}

impl Default for FlatSchemaGenerator {
    fn default() -> Self {
        Self {
            text_length: 255,
            db_compatible_mode: false,
        }
    }
}

impl FlatSchemaGenerator {
    pub fn new(text_length: u32, db_compatible_mode: bool) -> Result<Self> {
        if text_length == 0 {
            return Err(OptionError::InvalidConfig(
                "flat text length must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            text_length,
            db_compatible_mode,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(config.flat_text_length, config.db_compatible_mode)
    }

    /// Columns and indexes together.
    pub fn generate(&self, attribute: &AttributeMetadata) -> Result<FlatSchema> {
        Ok(FlatSchema {
            columns: self.columns(attribute)?,
            indexes: self.indexes(attribute)?,
        })
    }

    // == Columns ==
    pub fn columns(&self, attribute: &AttributeMetadata) -> Result<Vec<ColumnDescriptor>> {
        attribute.validate_code()?;
        let code = &attribute.code;
        let is_multi = attribute.is_multiselect();

        let primary = if is_multi {
            self.text_column(code, code)
        } else {
            self.id_column(code, code)
        };
        let mut columns = vec![primary];
        if !is_multi {
            columns.push(self.text_column(&format!("{}_value", code), code));
        }
        Ok(columns)
    }

    fn id_column(&self, name: &str, code: &str) -> ColumnDescriptor {
        if self.db_compatible_mode {
            ColumnDescriptor::new(name, ColumnType::Int)
        } else {
            ColumnDescriptor::new(name, ColumnType::Integer)
                .with_comment(format!("{} column", code))
        }
    }

    fn text_column(&self, name: &str, code: &str) -> ColumnDescriptor {
        if self.db_compatible_mode {
            ColumnDescriptor::new(name, ColumnType::Varchar(self.text_length))
        } else {
            ColumnDescriptor::new(name, ColumnType::Text)
                .with_length(self.text_length)
                .with_comment(format!("{} column", code))
        }
    }

    // == Indexes ==
    /// `IDX_<CODE>` on the primary column, plus `IDX_<CODE>_VALUE` on the
    /// label column for sortable single-selects.
    pub fn indexes(&self, attribute: &AttributeMetadata) -> Result<Vec<IndexDescriptor>> {
        attribute.validate_code()?;
        let code = &attribute.code;
        let upper = code.to_uppercase();

        let mut indexes = vec![IndexDescriptor::index(
            format!("IDX_{}", upper),
            vec![code.clone()],
        )];
        if attribute.used_for_sort_by && !attribute.is_multiselect() {
            indexes.push(IndexDescriptor::index(
                format!("IDX_{}_VALUE", upper),
                vec![format!("{}_value", code)],
            ));
        }
        Ok(indexes)
    }
}
