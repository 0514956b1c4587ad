//! Staged query
//!
//! Buffers instructions against a read-only view of a [`SelectQuery`] so a
//! multi-step builder either applies every instruction or none of them.

use crate::error::{OptionError, Result};
use crate::models::StoreId;
use crate::query::{Expr, Join, Order, SelectQuery, SortDirection};

/// A [`SelectQuery`] that validates against `target` but records into
/// itself. Finish with [`StagedQuery::into_changes`] and apply the result.
pub struct StagedQuery<'t> {
    target: &'t dyn SelectQuery,
    changes: StagedChanges,
}

/// Instructions accepted by a [`StagedQuery`], not yet applied.
#[derive(Debug, Default)]
pub struct StagedChanges {
    joins: Vec<Join>,
    columns: Vec<(String, Expr)>,
    orders: Vec<Order>,
}

impl<'t> StagedQuery<'t> {
    pub fn new(target: &'t dyn SelectQuery) -> Self {
        Self {
            target,
            changes: StagedChanges::default(),
        }
    }

    pub fn into_changes(self) -> StagedChanges {
        self.changes
    }
}

impl SelectQuery for StagedQuery<'_> {
    fn store_id(&self) -> StoreId {
        self.target.store_id()
    }

    fn main_alias(&self) -> &str {
        self.target.main_alias()
    }

    fn has_table(&self, alias: &str) -> bool {
        self.target.has_table(alias) || self.changes.joins.iter().any(|j| j.alias == alias)
    }

    fn has_column(&self, alias: &str) -> bool {
        self.target.has_column(alias)
            || self.changes.columns.iter().any(|(name, _)| name == alias)
    }

    fn add_left_join(&mut self, join: Join) -> Result<()> {
        if self.has_table(&join.alias) {
            return Err(OptionError::Query(format!(
                "table alias '{}' is already in use",
                join.alias
            )));
        }
        self.changes.joins.push(join);
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
        self.changes.columns.retain(|(name, _)| name != alias);
        self.changes.columns.push((alias.to_string(), expr));
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
        self.changes.orders.push(Order { expr, direction });
        Ok(())
    }
}

impl StagedChanges {
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty() && self.columns.is_empty() && self.orders.is_empty()
    }

    /// Applies joins, then columns, then orders to `query`.
    pub fn apply(self, query: &mut dyn SelectQuery) -> Result<()> {
        for join in self.joins {
            query.add_left_join(join)?;
        }
        for (alias, expr) in self.columns {
            query.add_column(&alias, expr)?;
        }
        for order in self.orders {
            query.add_order(order.expr, order.direction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Condition, QueryPlan};

    fn join(alias: &str) -> Join {
        Join::new(
            alias,
            "eav_entity_int",
            Condition::eq(Expr::column("e", "entity_id"), Expr::column(alias, "entity_id")),
        )
    }

    #[test]
    fn test_staged_instructions_leave_target_untouched() {
        let plan = QueryPlan::new(StoreId(1), "catalog_product_entity", "e");
        let mut staged = StagedQuery::new(&plan);
        staged.add_left_join(join("t1")).unwrap();
        staged.add_column("color", Expr::column("t1", "value")).unwrap();
        staged.add_order(Expr::alias("color"), SortDirection::Asc).unwrap();

        let changes = staged.into_changes();
        assert!(!changes.is_empty());
        assert!(plan.joins.is_empty());
        assert!(plan.columns.is_empty());
    }

    #[test]
    fn test_staged_rejects_alias_taken_by_target() {
        let mut plan = QueryPlan::new(StoreId(1), "catalog_product_entity", "e");
        plan.add_left_join(join("t1")).unwrap();

        let mut staged = StagedQuery::new(&plan);
        assert!(matches!(staged.add_left_join(join("t1")), Err(OptionError::Query(_))));
        staged.add_left_join(join("t2")).unwrap();
        assert!(staged.add_left_join(join("t2")).is_err());
        // Columns may read the target's tables and the staged ones.
        staged.add_column("picked", Expr::column("t1", "value")).unwrap();
        staged.add_column("other", Expr::column("t2", "value")).unwrap();
        assert!(staged.add_column("bad", Expr::column("t3", "value")).is_err());
    }

    #[test]
    fn test_apply_commits_in_order() {
        let mut plan = QueryPlan::new(StoreId(1), "catalog_product_entity", "e");
        let mut staged = StagedQuery::new(&plan);
        staged.add_left_join(join("t1")).unwrap();
        staged.add_column("color", Expr::column("t1", "value")).unwrap();
        staged.add_order(Expr::alias("color"), SortDirection::Desc).unwrap();
        let changes = staged.into_changes();

        changes.apply(&mut plan).unwrap();
        assert!(plan.join("t1").is_some());
        assert_eq!(plan.column("color"), Some(&Expr::column("t1", "value")));
        assert_eq!(plan.orders[0].direction, SortDirection::Desc);
    }
}
