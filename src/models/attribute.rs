//! Attribute metadata
//!
//! Read-only view of the attribute facts the option source and the
//! generators depend on.

use serde::Serialize;

use crate::error::{OptionError, Result};
use crate::models::{AttributeId, StoreId};

/// Frontend input type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Select,
    Multiselect,
    Other,
}

/// Metadata for one selectable attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeMetadata {
    pub id: AttributeId,
    pub code: String,
    /// Store scope the attribute is currently being read in, if any
    pub store_id: Option<StoreId>,
    pub input_type: InputType,
    /// Whether the attribute is offered as a sort key
    pub used_for_sort_by: bool,
    /// Table holding the attribute's per-entity values
    pub value_table: String,
}

impl AttributeMetadata {
    pub fn new(id: AttributeId, code: impl Into<String>, input_type: InputType) -> Self {
        Self {
            id,
            code: code.into(),
            store_id: None,
            input_type,
            used_for_sort_by: false,
            value_table: "eav_entity_int".to_string(),
        }
    }

    pub fn with_store(mut self, store_id: StoreId) -> Self {
        self.store_id = Some(store_id);
        self
    }

    pub fn sortable(mut self, used_for_sort_by: bool) -> Self {
        self.used_for_sort_by = used_for_sort_by;
        self
    }

    pub fn with_value_table(mut self, table: impl Into<String>) -> Self {
        self.value_table = table.into();
        self
    }

    pub fn is_multiselect(&self) -> bool {
        self.input_type == InputType::Multiselect
    }

    /// Fails fast when the code cannot name a column or index.
    pub fn validate_code(&self) -> Result<()> {
        if self.code.is_empty() {
            return Err(OptionError::InvalidConfig(format!(
                "attribute {} has an empty code",
                self.id
            )));
        }
        let valid = self
            .code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid || self.code.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(OptionError::InvalidConfig(format!(
                "attribute code '{}' is not a valid identifier",
                self.code
            )));
        }
        Ok(())
    }

    /// Fails fast when the value table is missing.
    pub fn validate_value_table(&self) -> Result<()> {
        if self.value_table.trim().is_empty() {
            return Err(OptionError::InvalidConfig(format!(
                "attribute '{}' has no value table",
                self.code
            )));
        }
        Ok(())
    }
}
