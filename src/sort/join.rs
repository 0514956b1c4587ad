//! Sort Join Builder
//!
//! Emits the joins and ordering that sort an entity query by an option
//! label instead of the raw option id. Builds only; never executes.

use tracing::debug;

use crate::error::Result;
use crate::models::{AttributeMetadata, StoreId};
use crate::query::{Condition, Expr, Join, SelectQuery, SortDirection, StagedQuery};
use crate::repository::OptionRepository;

/// Adds value-sort instructions to a [`SelectQuery`].
pub struct SortJoinBuilder<'a> {
    repository: &'a dyn OptionRepository,
}

impl<'a> SortJoinBuilder<'a> {
    pub fn new(repository: &'a dyn OptionRepository) -> Self {
        Self { repository }
    }

    /// Joins the attribute's value table in the default scope (`<code>_t1`)
    /// and the query's store scope (`<code>_t2`), picks the store value when
    /// a store row exists, lets the repository resolve that option id to its
    /// label under the attribute code, and orders by it.
    ///
    /// Every instruction is staged first; on error `query` is unchanged.
    pub fn apply<'q, Q: SelectQuery>(
        &self,
        attribute: &AttributeMetadata,
        query: &'q mut Q,
        direction: SortDirection,
    ) -> Result<&'q mut Q> {
        attribute.validate_code()?;
        attribute.validate_value_table()?;

        let default_alias = format!("{}_t1", attribute.code);
        let store_alias = format!("{}_t2", attribute.code);
        let store_id = query.store_id();

        let mut staged = StagedQuery::new(&*query);
        let entity_alias = staged.main_alias().to_string();
        let default_join =
            self.value_join(attribute, &entity_alias, &default_alias, StoreId::DEFAULT);
        let store_join = self.value_join(attribute, &entity_alias, &store_alias, store_id);
        staged.add_left_join(default_join)?;
        staged.add_left_join(store_join)?;

        let value_expr = Expr::case(
            Condition::is_not_null(Expr::column(&store_alias, "value_id")),
            Expr::column(&store_alias, "value"),
            Expr::column(&default_alias, "value"),
        );
        self.repository
            .add_option_value_to_query(&mut staged, attribute, value_expr)?;
        staged.add_order(Expr::alias(&attribute.code), direction)?;
        staged.into_changes().apply(query)?;

        debug!(
            attribute = %attribute.code,
            store = %store_id,
            direction = %direction,
            "added option value sort"
        );
        Ok(query)
    }

    fn value_join(
        &self,
        attribute: &AttributeMetadata,
        entity_alias: &str,
        alias: &str,
        store_id: StoreId,
    ) -> Join {
        Join::new(
            alias,
            &attribute.value_table,
            Condition::and([
                Condition::eq(
                    Expr::column(entity_alias, "entity_id"),
                    Expr::column(alias, "entity_id"),
                ),
                Condition::eq(
                    Expr::column(alias, "attribute_id"),
                    Expr::int(i64::from(attribute.id.0)),
                ),
                Condition::eq(
                    Expr::column(alias, "store_id"),
                    Expr::int(i64::from(store_id.0)),
                ),
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptionError;
    use crate::models::{AttributeId, InputType};
    use crate::query::QueryPlan;
    use crate::repository::MemoryOptionRepository;

    fn color() -> AttributeMetadata {
        AttributeMetadata::new(AttributeId(3), "color", InputType::Select)
            .with_value_table("catalog_product_entity_int")
    }

    fn query() -> QueryPlan {
        QueryPlan::new(StoreId(2), "catalog_product_entity", "e")
    }

    #[test]
    fn test_value_joins_scoped_to_default_and_query_store() {
        let repo = MemoryOptionRepository::new(vec![]);
        let mut plan = query();
        SortJoinBuilder::new(&repo)
            .apply(&color(), &mut plan, SortDirection::Asc)
            .unwrap();

        let t1 = plan.join("color_t1").unwrap();
        let t2 = plan.join("color_t2").unwrap();
        assert_eq!(t1.table, "catalog_product_entity_int");
        assert_eq!(t2.table, "catalog_product_entity_int");

        let store_filter = |store: i64, alias: &str| {
            Condition::eq(Expr::column(alias, "store_id"), Expr::int(store))
        };
        let Condition::And { conditions } = &t1.on else {
            panic!("expected conjunction");
        };
        assert!(conditions.contains(&store_filter(0, "color_t1")));
        let Condition::And { conditions } = &t2.on else {
            panic!("expected conjunction");
        };
        assert!(conditions.contains(&store_filter(2, "color_t2")));
        assert!(conditions.contains(&Condition::eq(
            Expr::column("e", "entity_id"),
            Expr::column("color_t2", "entity_id")
        )));
    }

    #[test]
    fn test_orders_by_attribute_code_with_store_fallback() {
        let repo = MemoryOptionRepository::new(vec![]);
        let mut plan = query();
        SortJoinBuilder::new(&repo)
            .apply(&color(), &mut plan, SortDirection::Desc)
            .unwrap();

        assert_eq!(plan.orders.len(), 1);
        assert_eq!(plan.orders[0].expr, Expr::alias("color"));
        assert_eq!(plan.orders[0].direction, SortDirection::Desc);

        // The label joins are keyed on the store-then-default option id.
        let value_expr = Expr::case(
            Condition::is_not_null(Expr::column("color_t2", "value_id")),
            Expr::column("color_t2", "value"),
            Expr::column("color_t1", "value"),
        );
        let label_join = plan.join("color_option_value_t1").unwrap();
        let Condition::And { conditions } = &label_join.on else {
            panic!("expected conjunction");
        };
        assert!(conditions.contains(&Condition::eq(
            Expr::column("color_option_value_t1", "option_id"),
            value_expr
        )));
        assert!(plan.column("color").is_some());
        assert_eq!(plan.joins.len(), 4);
    }

    #[test]
    fn test_builder_returns_same_query_for_chaining() {
        let repo = MemoryOptionRepository::new(vec![]);
        let mut plan = query();
        let returned = SortJoinBuilder::new(&repo)
            .apply(&color(), &mut plan, SortDirection::Asc)
            .unwrap();
        returned.add_filter(Condition::is_not_null(Expr::column("e", "entity_id")));
        assert_eq!(plan.filters.len(), 1);
    }

    #[test]
    fn test_empty_code_fails_fast() {
        let repo = MemoryOptionRepository::new(vec![]);
        let attr = AttributeMetadata::new(AttributeId(3), "", InputType::Select);
        let mut plan = query();

        let result = SortJoinBuilder::new(&repo).apply(&attr, &mut plan, SortDirection::Asc);
        assert!(matches!(result, Err(OptionError::InvalidConfig(_))));
        assert!(plan.joins.is_empty());
    }

    #[test]
    fn test_failed_label_join_leaves_query_unchanged() {
        let repo = MemoryOptionRepository::new(vec![]);
        let mut plan = query();
        plan.add_left_join(Join::new(
            "color_option_value_t1",
            "eav_attribute_option_value",
            Condition::is_not_null(Expr::column("e", "entity_id")),
        ))
        .unwrap();
        let before = plan.clone();

        let result = SortJoinBuilder::new(&repo).apply(&color(), &mut plan, SortDirection::Asc);
        assert!(matches!(result, Err(OptionError::Query(_))));
        assert_eq!(plan, before);
        assert!(plan.join("color_t1").is_none());
    }

    #[test]
    fn test_second_sort_on_same_attribute_is_rejected() {
        let repo = MemoryOptionRepository::new(vec![]);
        let mut plan = query();
        let builder = SortJoinBuilder::new(&repo);
        builder.apply(&color(), &mut plan, SortDirection::Asc).unwrap();

        let before = plan.clone();

        let result = builder.apply(&color(), &mut plan, SortDirection::Desc);
        assert!(matches!(result, Err(OptionError::Query(_))));
        assert_eq!(plan, before);
    }
}
