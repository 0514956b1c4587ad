//! Fetch criteria and the preload extension hook.

use crate::models::{AttributeId, OptionId, StoreId};
use crate::query::SortDirection;

/// Criteria for one store-wide option fetch.
///
/// The cache always starts from [`OptionCriteria::for_store`]; a
/// [`PreloadFilter`] may narrow it before the fetch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCriteria {
    pub store_id: StoreId,
    pub position_order: SortDirection,
    /// Only fetch options of these attributes, when set
    pub attribute_ids: Option<Vec<AttributeId>>,
    /// Only fetch these options, when set
    pub option_ids: Option<Vec<OptionId>>,
}

impl OptionCriteria {
    /// All options of a store, ascending by position.
    pub fn for_store(store_id: StoreId) -> Self {
        Self {
            store_id,
            position_order: SortDirection::Asc,
            attribute_ids: None,
            option_ids: None,
        }
    }

    pub fn restrict_attributes(&mut self, ids: impl IntoIterator<Item = AttributeId>) {
        self.attribute_ids = Some(ids.into_iter().collect());
    }

    pub fn restrict_options(&mut self, ids: impl IntoIterator<Item = OptionId>) {
        self.option_ids = Some(ids.into_iter().collect());
    }

    /// Returns true if an option passes the attribute/option restrictions.
    pub fn matches(&self, attribute_id: AttributeId, option_id: OptionId) -> bool {
        let attribute_ok = self
            .attribute_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&attribute_id));
        let option_ok = self
            .option_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&option_id));
        attribute_ok && option_ok
    }
}

/// Hook run before every store load; may narrow the criteria, e.g. when a
/// page only needs the options of a few attributes.
pub trait PreloadFilter: Send + Sync {
    fn adjust(&self, criteria: &mut OptionCriteria);
}

impl<F> PreloadFilter for F
where
    F: Fn(&mut OptionCriteria) + Send + Sync,
{
    fn adjust(&self, criteria: &mut OptionCriteria) {
        self(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_matches_everything() {
        let criteria = OptionCriteria::for_store(StoreId(1));
        assert_eq!(criteria.position_order, SortDirection::Asc);
        assert!(criteria.matches(AttributeId(1), OptionId(99)));
    }

    #[test]
    fn test_closure_filter_narrows() {
        let filter = |c: &mut OptionCriteria| c.restrict_attributes([AttributeId(7)]);
        let mut criteria = OptionCriteria::for_store(StoreId(1));
        filter.adjust(&mut criteria);

        assert!(criteria.matches(AttributeId(7), OptionId(1)));
        assert!(!criteria.matches(AttributeId(8), OptionId(1)));
    }

    #[test]
    fn test_option_restriction() {
        let mut criteria = OptionCriteria::for_store(StoreId(1));
        criteria.restrict_options([OptionId(5)]);
        assert!(criteria.matches(AttributeId(1), OptionId(5)));
        assert!(!criteria.matches(AttributeId(1), OptionId(6)));
    }
}
