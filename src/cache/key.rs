//! Cache Key Module
//!
//! Typed composite keys for the option cache indexes.

use std::fmt;

use crate::models::{AttributeId, OptionId, StoreId};

/// Which label set a cached list carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Labels resolved for the store (override, else default)
    Store,
    /// Default (store 0) labels
    Default,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Store => f.write_str("store"),
            LabelKind::Default => f.write_str("default"),
        }
    }
}

/// The id a key is about. Attribute and option ids live in separate
/// variants so equal numbers never share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Attribute(AttributeId),
    Option(OptionId),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Attribute(id) => write!(f, "attribute:{}", id),
            Subject::Option(id) => write!(f, "option:{}", id),
        }
    }
}

// == Cache Key ==
/// `(store, subject, kind)` composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub store_id: StoreId,
    pub subject: Subject,
    pub kind: LabelKind,
}

impl CacheKey {
    /// Key of an attribute's option list.
    pub fn attribute(store_id: StoreId, attribute_id: AttributeId, kind: LabelKind) -> Self {
        Self {
            store_id,
            subject: Subject::Attribute(attribute_id),
            kind,
        }
    }

    /// Key of a single option's store label.
    pub fn option(store_id: StoreId, option_id: OptionId) -> Self {
        Self {
            store_id,
            subject: Subject::Option(option_id),
            kind: LabelKind::Store,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.store_id, self.subject, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_attribute_and_option_with_same_id_differ() {
        let attr = CacheKey::attribute(StoreId(1), AttributeId(5), LabelKind::Store);
        let option = CacheKey::option(StoreId(1), OptionId(5));
        assert_ne!(attr, option);
        assert_ne!(attr.to_string(), option.to_string());
    }

    #[test]
    fn test_display_format() {
        let key = CacheKey::attribute(StoreId(2), AttributeId(9), LabelKind::Default);
        assert_eq!(key.to_string(), "2|attribute:9|default");
    }

    #[test]
    fn test_distinct_triples_hash_apart() {
        let keys: HashSet<CacheKey> = [
            CacheKey::attribute(StoreId(1), AttributeId(1), LabelKind::Store),
            CacheKey::attribute(StoreId(1), AttributeId(1), LabelKind::Default),
            CacheKey::attribute(StoreId(11), AttributeId(1), LabelKind::Store),
            CacheKey::attribute(StoreId(1), AttributeId(11), LabelKind::Store),
            CacheKey::option(StoreId(1), OptionId(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 5);
    }
}
