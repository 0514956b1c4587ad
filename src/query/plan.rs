//! Recording query
//!
//! `QueryPlan` keeps every instruction it receives so a query engine (or a
//! test) can inspect the resulting joins, columns and ordering.

use serde::Serialize;

use crate::error::{OptionError, Result};
use crate::models::StoreId;
use crate::query::{Condition, Expr, Join, SelectQuery, SortDirection};

/// An ordering instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub expr: Expr,
    pub direction: SortDirection,
}

/// A declarative select over an entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub store_id: StoreId,
    /// Main table and its alias
    pub from: (String, String),
    pub joins: Vec<Join>,
    /// Conditions on the main table
    pub filters: Vec<Condition>,
    pub columns: Vec<(String, Expr)>,
    pub orders: Vec<Order>,
}

impl QueryPlan {
    /// Creates a plan selecting from `table` aliased as `alias`.
    pub fn new(store_id: StoreId, table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            store_id,
            from: (table.into(), alias.into()),
            joins: Vec::new(),
            filters: Vec::new(),
            columns: Vec::new(),
            orders: Vec::new(),
        }
    }

    pub fn add_filter(&mut self, condition: Condition) {
        self.filters.push(condition);
    }

    pub fn join(&self, alias: &str) -> Option<&Join> {
        self.joins.iter().find(|j| j.alias == alias)
    }

    pub fn column(&self, alias: &str) -> Option<&Expr> {
        self.columns
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, expr)| expr)
    }
}

impl SelectQuery for QueryPlan {
    fn store_id(&self) -> StoreId {
        self.store_id
    }

    fn main_alias(&self) -> &str {
        &self.from.1
    }

    fn has_table(&self, alias: &str) -> bool {
        self.from.1 == alias || self.join(alias).is_some()
    }

    fn has_column(&self, alias: &str) -> bool {
        self.column(alias).is_some()
    }

    fn add_left_join(&mut self, join: Join) -> Result<()> {
        if self.has_table(&join.alias) {
            return Err(OptionError::Query(format!(
                "table alias '{}' is already in use",
                join.alias
            )));
        }
        self.joins.push(join);
        Ok(())
    }

    fn add_column(&mut self, alias: &str, expr: Expr) -> Result<()> {
        for table in expr.tables() {
            if !self.has_table(table) {
                return Err(OptionError::Query(format!(
                    "column '{}' references unknown table alias '{}'",
                    alias, table
                )));
            }
        }
        self.columns.retain(|(name, _)| name != alias);
        self.columns.push((alias.to_string(), expr));
        Ok(())
    }

    fn add_order(&mut self, expr: Expr, direction: SortDirection) -> Result<()> {
        if let Expr::Alias { name } = &expr {
            if !self.has_column(name) {
                return Err(OptionError::Query(format!(
                    "order references unknown column '{}'",
                    name
                )));
            }
        }
        self.orders.push(Order { expr, direction });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(alias: &str) -> Join {
        Join::new(
            alias,
            "eav_entity_int",
            Condition::eq(Expr::column("e", "entity_id"), Expr::column(alias, "entity_id")),
        )
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut plan = QueryPlan::new(StoreId(1), "catalog_product_entity", "e");
        plan.add_left_join(join("t1")).unwrap();
        assert!(matches!(plan.add_left_join(join("t1")), Err(OptionError::Query(_))));
        assert!(plan.add_left_join(join("e")).is_err());
    }

    #[test]
    fn test_column_requires_known_tables() {
        let mut plan = QueryPlan::new(StoreId(1), "catalog_product_entity", "e");
        let result = plan.add_column("color", Expr::column("missing", "value"));
        assert!(result.is_err());

        plan.add_left_join(join("t1")).unwrap();
        plan.add_column("color", Expr::column("t1", "value")).unwrap();
        assert_eq!(plan.column("color"), Some(&Expr::column("t1", "value")));
    }

    #[test]
    fn test_order_on_unknown_alias_rejected() {
        let mut plan = QueryPlan::new(StoreId(1), "catalog_product_entity", "e");
        let result = plan.add_order(Expr::alias("color"), SortDirection::Asc);
        assert!(result.is_err());
        assert!(plan.orders.is_empty());
    }
}
