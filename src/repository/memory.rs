//! In-memory option repository
//!
//! Holds option records in memory and emits label joins against the
//! `eav_attribute_option_value` table layout. Used for tests and for
//! embedding the cache without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::models::{AttributeId, AttributeMetadata, OptionId, OptionRow, StoreId};
use crate::query::{Condition, Expr, Join, QueryPlan, SelectQuery, SortDirection};
use crate::repository::{OptionCriteria, OptionRepository};

/// Default table holding option labels per store.
pub const OPTION_VALUE_TABLE: &str = "eav_attribute_option_value";

/// An option with its default label and per-store overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRecord {
    pub option_id: OptionId,
    pub attribute_id: AttributeId,
    pub position: i32,
    pub default_label: String,
    pub store_labels: HashMap<StoreId, String>,
}

impl OptionRecord {
    pub fn new(
        option_id: OptionId,
        attribute_id: AttributeId,
        position: i32,
        default_label: impl Into<String>,
    ) -> Self {
        Self {
            option_id,
            attribute_id,
            position,
            default_label: default_label.into(),
            store_labels: HashMap::new(),
        }
    }

    pub fn with_store_label(mut self, store_id: StoreId, label: impl Into<String>) -> Self {
        self.store_labels.insert(store_id, label.into());
        self
    }

    /// The store label, falling back to the default label. The default
    /// scope always reads the default label.
    pub fn label_for(&self, store_id: StoreId) -> &str {
        if store_id.is_default() {
            return &self.default_label;
        }
        self.store_labels
            .get(&store_id)
            .map(String::as_str)
            .unwrap_or(&self.default_label)
    }

    fn to_row(&self, store_id: StoreId) -> OptionRow {
        OptionRow {
            store_id,
            option_id: self.option_id,
            attribute_id: self.attribute_id,
            store_label: self.label_for(store_id).to_string(),
            default_label: self.default_label.clone(),
            position: self.position,
        }
    }
}

// == Memory Option Repository ==
/// Option repository backed by a vector of records.
#[derive(Debug)]
pub struct MemoryOptionRepository {
    records: RwLock<Vec<OptionRecord>>,
    option_value_table: String,
    fetches: AtomicUsize,
    unavailable: AtomicBool,
    fetch_delay: Option<Duration>,
}

impl MemoryOptionRepository {
    pub fn new(records: Vec<OptionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            option_value_table: OPTION_VALUE_TABLE.to_string(),
            fetches: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
            fetch_delay: None,
        }
    }

    /// Simulates fetch latency; each fetch sleeps for `delay` first.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn with_option_value_table(mut self, table: impl Into<String>) -> Self {
        self.option_value_table = table.into();
        self
    }

    /// Number of fetches served (or attempted) so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// While unavailable, every fetch fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inserts or replaces a record by option id.
    pub async fn upsert(&self, record: OptionRecord) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.option_id == record.option_id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    fn join_option_labels(
        &self,
        query: &mut dyn SelectQuery,
        attribute: &AttributeMetadata,
        value_expr: Expr,
        column_alias: &str,
    ) -> Result<()> {
        let default_alias = format!("{}_option_value_t1", attribute.code);
        let store_alias = format!("{}_option_value_t2", attribute.code);
        let store_id = query.store_id();

        query.add_left_join(Join::new(
            &default_alias,
            &self.option_value_table,
            Condition::and([
                Condition::eq(Expr::column(&default_alias, "option_id"), value_expr.clone()),
                Condition::eq(
                    Expr::column(&default_alias, "store_id"),
                    Expr::int(i64::from(StoreId::DEFAULT.0)),
                ),
            ]),
        ))?;
        query.add_left_join(Join::new(
            &store_alias,
            &self.option_value_table,
            Condition::and([
                Condition::eq(Expr::column(&store_alias, "option_id"), value_expr),
                Condition::eq(
                    Expr::column(&store_alias, "store_id"),
                    Expr::int(i64::from(store_id.0)),
                ),
            ]),
        ))?;

        let label = Expr::case(
            Condition::is_not_null(Expr::column(&store_alias, "value_id")),
            Expr::column(&store_alias, "value"),
            Expr::column(&default_alias, "value"),
        );
        query.add_column(column_alias, label)
    }
}

#[async_trait]
impl OptionRepository for MemoryOptionRepository {
    async fn fetch_options(&self, criteria: &OptionCriteria) -> anyhow::Result<Vec<OptionRow>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("option repository unavailable");
        }

        let records = self.records.read().await;
        let mut matching: Vec<&OptionRecord> = records
            .iter()
            .filter(|r| criteria.matches(r.attribute_id, r.option_id))
            .collect();
        matching.sort_by_key(|r| (r.position, r.option_id));
        if criteria.position_order == SortDirection::Desc {
            matching.reverse();
        }

        let rows: Vec<OptionRow> = matching
            .into_iter()
            .map(|r| r.to_row(criteria.store_id))
            .collect();
        debug!(store = %criteria.store_id, rows = rows.len(), "served option fetch");
        Ok(rows)
    }

    fn add_option_value_to_query(
        &self,
        query: &mut dyn SelectQuery,
        attribute: &AttributeMetadata,
        value_expr: Expr,
    ) -> Result<()> {
        attribute.validate_code()?;
        self.join_option_labels(query, attribute, value_expr, &attribute.code)
    }

    fn flat_update_select(
        &self,
        attribute: &AttributeMetadata,
        store_id: StoreId,
    ) -> Result<Option<QueryPlan>> {
        attribute.validate_code()?;
        attribute.validate_value_table()?;
        let attribute_id = i64::from(attribute.id.0);

        let mut plan = QueryPlan::new(store_id, &attribute.value_table, "t1");
        plan.add_filter(Condition::and([
            Condition::eq(Expr::column("t1", "attribute_id"), Expr::int(attribute_id)),
            Condition::eq(
                Expr::column("t1", "store_id"),
                Expr::int(i64::from(StoreId::DEFAULT.0)),
            ),
        ]));
        plan.add_left_join(Join::new(
            "t2",
            &attribute.value_table,
            Condition::and([
                Condition::eq(Expr::column("t1", "entity_id"), Expr::column("t2", "entity_id")),
                Condition::eq(Expr::column("t2", "attribute_id"), Expr::int(attribute_id)),
                Condition::eq(Expr::column("t2", "store_id"), Expr::int(i64::from(store_id.0))),
            ]),
        ))?;
        plan.add_column("entity_id", Expr::column("t1", "entity_id"))?;

        let value_expr = Expr::case(
            Condition::is_not_null(Expr::column("t2", "value_id")),
            Expr::column("t2", "value"),
            Expr::column("t1", "value"),
        );
        plan.add_column(&attribute.code, value_expr.clone())?;
        if !attribute.is_multiselect() {
            let label_column = format!("{}_value", attribute.code);
            self.join_option_labels(&mut plan, attribute, value_expr, &label_column)?;
        }
        Ok(Some(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InputType;

    fn records() -> Vec<OptionRecord> {
        vec![
            OptionRecord::new(OptionId(7), AttributeId(1), 2, "Blue")
                .with_store_label(StoreId(1), "Bleu"),
            OptionRecord::new(OptionId(5), AttributeId(1), 1, "Red"),
            OptionRecord::new(OptionId(9), AttributeId(2), 0, "Small"),
        ]
    }

    #[test]
    fn test_default_scope_ignores_store_zero_label() {
        let record = OptionRecord::new(OptionId(5), AttributeId(1), 1, "Red")
            .with_store_label(StoreId::DEFAULT, "Shadowed")
            .with_store_label(StoreId(1), "Rouge");

        assert_eq!(record.label_for(StoreId::DEFAULT), "Red");
        assert_eq!(record.label_for(StoreId(1)), "Rouge");
        assert_eq!(record.label_for(StoreId(2)), "Red");
    }

    #[tokio::test]
    async fn test_fetch_orders_by_position_and_resolves_labels() {
        let repo = MemoryOptionRepository::new(records());
        let rows = repo
            .fetch_options(&OptionCriteria::for_store(StoreId(1)))
            .await
            .unwrap();

        let ids: Vec<u32> = rows.iter().map(|r| r.option_id.0).collect();
        assert_eq!(ids, vec![9, 5, 7]);
        assert_eq!(rows[2].store_label, "Bleu");
        assert_eq!(rows[2].default_label, "Blue");
        assert_eq!(rows[1].store_label, "Red");
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_honours_restrictions() {
        let repo = MemoryOptionRepository::new(records());
        let mut criteria = OptionCriteria::for_store(StoreId(0));
        criteria.restrict_attributes([AttributeId(1)]);

        let rows = repo.fetch_options(&criteria).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.attribute_id == AttributeId(1)));
    }

    #[tokio::test]
    async fn test_unavailable_fails() {
        let repo = MemoryOptionRepository::new(records());
        repo.set_unavailable(true);
        let result = repo.fetch_options(&OptionCriteria::for_store(StoreId(0))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_upsert_replaces_record() {
        let repo = MemoryOptionRepository::new(records());
        repo.upsert(OptionRecord::new(OptionId(5), AttributeId(1), 1, "Crimson"))
            .await;
        let rows = repo
            .fetch_options(&OptionCriteria::for_store(StoreId(0)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().any(|r| r.store_label == "Crimson"));
    }

    #[test]
    fn test_flat_update_select_for_select_attribute() {
        let repo = MemoryOptionRepository::new(vec![]);
        let attr = AttributeMetadata::new(AttributeId(1), "color", InputType::Select);
        let plan = repo.flat_update_select(&attr, StoreId(2)).unwrap().unwrap();

        assert!(plan.column("entity_id").is_some());
        assert!(plan.column("color").is_some());
        assert!(plan.column("color_value").is_some());
        assert!(plan.join("color_option_value_t2").is_some());
    }

    #[test]
    fn test_flat_update_select_for_multiselect_skips_labels() {
        let repo = MemoryOptionRepository::new(vec![]);
        let attr = AttributeMetadata::new(AttributeId(4), "tags", InputType::Multiselect)
            .with_value_table("eav_entity_varchar");
        let plan = repo.flat_update_select(&attr, StoreId(2)).unwrap().unwrap();

        assert_eq!(plan.from.0, "eav_entity_varchar");
        assert!(plan.column("tags").is_some());
        assert!(plan.column("tags_value").is_none());
        assert_eq!(plan.joins.len(), 1);
    }
}
