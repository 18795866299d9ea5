use super::{Filter, Statement};
use crate::{
    node::Node,
    query::{Plan, Query},
    schema::Schema,
    Result,
};

/// `SELECT COUNT(...)` over a planned query.
#[derive(Debug, Clone)]
pub struct Count {
    pub plan: Box<Plan>,
    pub distinct: bool,

    /// Counted expressions. Empty means `COUNT(*)`.
    pub nodes: Vec<Node>,
}

/// Single-table select used by record bookkeeping: dependent-row checks,
/// enumeration table loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectRows {
    pub table: String,
    pub columns: Vec<String>,
    pub filter: Filter,
    pub order_by: Vec<String>,
}

impl Count {
    pub fn new(query: &Query, schema: &Schema, distinct: bool, nodes: Vec<Node>) -> Result<Count> {
        let plan = Plan::build_count(query, schema, &nodes)?;
        Ok(Count {
            plan: Box::new(plan),
            distinct,
            nodes,
        })
    }
}

impl SelectRows {
    pub fn new(table: impl Into<String>, columns: Vec<String>, filter: Filter) -> Self {
        Self {
            table: table.into(),
            columns,
            filter,
            order_by: vec![],
        }
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }
}

impl From<Count> for Statement {
    fn from(value: Count) -> Self {
        Statement::Count(value)
    }
}

impl From<SelectRows> for Statement {
    fn from(value: SelectRows) -> Self {
        Statement::SelectRows(value)
    }
}
