use super::Operation;

use crate::{schema::ColumnType, stmt};

#[derive(Debug, Clone)]
pub struct QuerySql {
    /// The SQL statement to execute
    pub stmt: stmt::Statement,

    /// Expected column types of the result, in projection order. `None` means
    /// the statement only reports a row count. A `None` entry is scanned by
    /// the column's native type (computed projections).
    pub ret: Option<Vec<Option<ColumnType>>>,
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::QuerySql(value)
    }
}
