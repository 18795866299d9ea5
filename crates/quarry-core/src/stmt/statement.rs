use super::{Count, Delete, Insert, SelectRows, Update};
use crate::query::Plan;

/// A statement ready for serialization by a SQL dialect.
#[derive(Debug, Clone)]
pub enum Statement {
    /// Planned query with joins, projected through column aliases
    Select(Box<Plan>),

    /// Row count over a planned query
    Count(Count),

    /// Delete the root rows matched by a planned query
    DeleteQuery(Box<Plan>),

    Insert(Insert),
    Update(Update),
    Delete(Delete),
    SelectRows(SelectRows),
}

impl Statement {
    pub fn is_insert(&self) -> bool {
        matches!(self, Statement::Insert(_))
    }

    /// Short label for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Select(_) => "select",
            Statement::Count(_) => "count",
            Statement::DeleteQuery(_) => "delete query",
            Statement::Insert(_) => "insert",
            Statement::Update(_) => "update",
            Statement::Delete(_) => "delete",
            Statement::SelectRows(_) => "select rows",
        }
    }
}

impl From<Plan> for Statement {
    fn from(value: Plan) -> Self {
        Statement::Select(Box::new(value))
    }
}
