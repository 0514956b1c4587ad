//! Expression tree for join conditions, selected columns and ordering.
//!
//! Values travel as bound parameters; nothing here renders SQL text.

use serde::Serialize;

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

/// A scalar expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `alias.column`
    Column { table: String, column: String },
    /// A column alias defined by `SelectQuery::add_column`
    Alias { name: String },
    /// A bound parameter
    Param { value: Value },
    /// `CASE WHEN condition THEN then ELSE otherwise END`
    Case {
        when: Box<Condition>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Column {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn alias(name: impl Into<String>) -> Self {
        Expr::Alias { name: name.into() }
    }

    pub fn int(value: i64) -> Self {
        Expr::Param {
            value: Value::Int(value),
        }
    }

    pub fn case(when: Condition, then: Expr, otherwise: Expr) -> Self {
        Expr::Case {
            when: Box::new(when),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Table aliases this expression reads from.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables = Vec::new();
        self.collect_tables(&mut tables);
        tables
    }

    fn collect_tables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column { table, .. } => {
                if !out.contains(&table.as_str()) {
                    out.push(table);
                }
            }
            Expr::Alias { .. } | Expr::Param { .. } => {}
            Expr::Case {
                when,
                then,
                otherwise,
            } => {
                when.collect_tables(out);
                then.collect_tables(out);
                otherwise.collect_tables(out);
            }
        }
    }
}

/// A boolean condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Eq { left: Expr, right: Expr },
    IsNotNull { expr: Expr },
    And { conditions: Vec<Condition> },
}

impl Condition {
    pub fn eq(left: Expr, right: Expr) -> Self {
        Condition::Eq { left, right }
    }

    pub fn is_not_null(expr: Expr) -> Self {
        Condition::IsNotNull { expr }
    }

    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::And {
            conditions: conditions.into_iter().collect(),
        }
    }

    fn collect_tables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Eq { left, right } => {
                left.collect_tables(out);
                right.collect_tables(out);
            }
            Condition::IsNotNull { expr } => expr.collect_tables(out),
            Condition::And { conditions } => {
                for condition in conditions {
                    condition.collect_tables(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_tables_deduplicated() {
        let expr = Expr::case(
            Condition::is_not_null(Expr::column("t2", "value_id")),
            Expr::column("t2", "value"),
            Expr::column("t1", "value"),
        );
        assert_eq!(expr.tables(), vec!["t2", "t1"]);
    }

    #[test]
    fn test_param_serializes_untagged_value() {
        let json = serde_json::to_value(Expr::int(7)).unwrap();
        assert_eq!(json["kind"], "param");
        assert_eq!(json["value"], 7);
    }
}
