use super::Operation;

use crate::{schema::ColumnType, stmt};

#[derive(Debug, Clone)]
pub struct Insert {
    pub stmt: stmt::Insert,

    /// Type of the generated key named by `stmt.returning`. The response is a
    /// single row with a single cell when set, and a row count otherwise.
    pub ret: Option<ColumnType>,
}

impl From<Insert> for Operation {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
