//! Option data units
//!
//! Identifiers, loaded option rows and the shapes returned to callers.

use std::fmt;

use serde::{Serialize, Serializer};

/// Store scope identifier. Store `0` is the default (admin) scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StoreId(pub u32);

impl StoreId {
    /// The canonical default scope holding every option's default label.
    pub const DEFAULT: StoreId = StoreId(0);

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AttributeId(pub u32);

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Option identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OptionId(pub u32);

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// == Option Row ==
/// One option joined with its label for a single store, as returned by the
/// option repository.
///
/// `store_label` is already resolved: when the store has no override it
/// carries the default label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    pub store_id: StoreId,
    pub option_id: OptionId,
    pub attribute_id: AttributeId,
    pub store_label: String,
    pub default_label: String,
    pub position: i32,
}

// == Option Item ==
/// A `{value, label}` pair as rendered in option lists.
///
/// `value` is `None` only for the "no selection" placeholder, which
/// serializes with an empty string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    #[serde(serialize_with = "serialize_option_value")]
    pub value: Option<OptionId>,
    pub label: String,
}

impl OptionItem {
    pub fn new(option_id: OptionId, label: impl Into<String>) -> Self {
        Self {
            value: Some(option_id),
            label: label.into(),
        }
    }

    /// The empty `{value: "", label: ""}` entry meaning "no selection".
    pub fn placeholder() -> Self {
        Self {
            value: None,
            label: String::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_none()
    }
}

fn serialize_option_value<S>(value: &Option<OptionId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(id) => serializer.serialize_str(&id.to_string()),
        None => serializer.serialize_str(""),
    }
}

// == Option Text ==
/// Result of resolving a raw attribute value to label text.
///
/// Single values resolve to [`OptionText::Single`] or
/// [`OptionText::NotFound`]; values containing the multi-value delimiter
/// always resolve to [`OptionText::Multiple`], possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionText {
    Single(String),
    Multiple(Vec<String>),
    NotFound,
}

impl OptionText {
    pub fn is_found(&self) -> bool {
        !matches!(self, OptionText::NotFound)
    }

    /// Returns the single label, if this is a found single value.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            OptionText::Single(label) => Some(label),
            _ => None,
        }
    }

    /// Returns the labels of a multi-value result.
    pub fn as_multiple(&self) -> Option<&[String]> {
        match self {
            OptionText::Multiple(labels) => Some(labels),
            _ => None,
        }
    }
}
