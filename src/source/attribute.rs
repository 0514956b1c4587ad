//! Attribute Option Source
//!
//! Resolves an attribute's store scope, reads its options through the
//! shared [`OptionCache`] and decodes raw single and multi values into
//! label text.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::cache::{LabelKind, OptionCache};
use crate::config::Config;
use crate::error::Result;
use crate::flat::{ColumnDescriptor, FlatSchemaGenerator, IndexDescriptor};
use crate::models::{AttributeMetadata, OptionId, OptionItem, OptionText, StoreId};
use crate::query::{QueryPlan, SelectQuery, SortDirection};
use crate::sort::SortJoinBuilder;

// == Attribute Option Source ==
/// Option access for one attribute.
///
/// Cheap to create per use. Option lists fetched through
/// [`get_all_options`](Self::get_all_options) are memoized per store and
/// label kind for the lifetime of the source.
#[derive(Debug)]
pub struct AttributeOptionSource {
    cache: Arc<OptionCache>,
    attribute: AttributeMetadata,
    default_store_id: StoreId,
    delimiter: char,
    memo: HashMap<(StoreId, LabelKind), Arc<[OptionItem]>>,
}

impl AttributeOptionSource {
    pub fn new(cache: Arc<OptionCache>, attribute: AttributeMetadata) -> Self {
        Self::with_config(cache, attribute, &Config::default())
    }

    /// Creates a source using the fallback store and delimiter from `config`.
    pub fn with_config(
        cache: Arc<OptionCache>,
        attribute: AttributeMetadata,
        config: &Config,
    ) -> Self {
        Self {
            cache,
            attribute,
            default_store_id: config.default_store_id,
            delimiter: config.multi_value_delimiter,
            memo: HashMap::new(),
        }
    }

    pub fn attribute(&self) -> &AttributeMetadata {
        &self.attribute
    }

    /// Switches the store scope the attribute is read in.
    pub fn with_store(mut self, store_id: StoreId) -> Self {
        self.attribute.store_id = Some(store_id);
        self
    }

    /// Effective store scope: the attribute's store, else the configured
    /// default store.
    pub fn store_id(&self) -> StoreId {
        self.attribute.store_id.unwrap_or(self.default_store_id)
    }

    // == All Options ==
    /// Returns every option of the attribute in position order.
    ///
    /// With `with_empty`, a `{value: "", label: ""}` placeholder comes first.
    /// With `use_default_labels`, labels are the default (store 0) ones.
    pub async fn get_all_options(
        &mut self,
        with_empty: bool,
        use_default_labels: bool,
    ) -> Result<Vec<OptionItem>> {
        let store_id = self.store_id();
        let kind = if use_default_labels {
            LabelKind::Default
        } else {
            LabelKind::Store
        };

        let items = match self.memo.get(&(store_id, kind)) {
            Some(items) => items.clone(),
            None => {
                let items = self
                    .cache
                    .options_for(store_id, self.attribute.id, kind)
                    .await?;
                self.memo.insert((store_id, kind), items.clone());
                items
            }
        };

        let mut options = Vec::with_capacity(items.len() + usize::from(with_empty));
        if with_empty {
            options.push(OptionItem::placeholder());
        }
        options.extend(items.iter().cloned());
        Ok(options)
    }

    // == Option Text ==
    /// Resolves a raw attribute value to label text.
    ///
    /// A value containing the delimiter is a multi-value: ids that are
    /// unknown or unparseable are dropped and the found labels are returned
    /// in input order. A single value yields its label or
    /// [`OptionText::NotFound`].
    pub async fn get_option_text(&self, raw_value: &str) -> Result<OptionText> {
        let store_id = self.store_id();
        self.cache.ensure_loaded(store_id).await?;

        if raw_value.contains(self.delimiter) {
            let ids: Vec<OptionId> = raw_value
                .split(self.delimiter)
                .filter_map(parse_option_id)
                .collect();
            let labels = self.cache.labels(store_id, &ids).await?;
            return Ok(OptionText::Multiple(labels.into_iter().flatten().collect()));
        }

        let Some(option_id) = parse_option_id(raw_value) else {
            trace!(attribute = %self.attribute.code, value = raw_value, "unparseable option value");
            return Ok(OptionText::NotFound);
        };
        Ok(match self.cache.label(store_id, option_id).await? {
            Some(label) => OptionText::Single(label),
            None => OptionText::NotFound,
        })
    }

    // == Flat Table ==
    /// Flat table columns for this attribute.
    pub fn flat_columns(&self, generator: &FlatSchemaGenerator) -> Result<Vec<ColumnDescriptor>> {
        generator.columns(&self.attribute)
    }

    /// Flat table indexes for this attribute.
    pub fn flat_indexes(&self, generator: &FlatSchemaGenerator) -> Result<Vec<IndexDescriptor>> {
        generator.indexes(&self.attribute)
    }

    /// Select that fills this attribute's flat columns for `store_id`,
    /// as provided by the option repository.
    pub fn flat_update_select(&self, store_id: StoreId) -> Result<Option<QueryPlan>> {
        self.cache
            .repository()
            .flat_update_select(&self.attribute, store_id)
    }

    // == Value Sort ==
    /// Makes `query` order by this attribute's resolved option label.
    pub fn add_value_sort_to_query<'q, Q: SelectQuery>(
        &self,
        query: &'q mut Q,
        direction: SortDirection,
    ) -> Result<&'q mut Q> {
        SortJoinBuilder::new(self.cache.repository().as_ref()).apply(
            &self.attribute,
            query,
            direction,
        )
    }
}

fn parse_option_id(raw: &str) -> Option<OptionId> {
    raw.trim().parse().ok().map(OptionId)
}
