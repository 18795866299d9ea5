mod delete;

mod row;
pub use row::{Collection, Row};

mod save;

use crate::{json, Context, Db, Node, Result};

use quarry_core::{stmt::Value, Schema};

/// A generated, typed record. Implementations are thin wrappers around a
/// [`Row`]; all state lives in the row.
pub trait Record: Sized + Send {
    /// Table the record is stored in
    const TABLE: &'static str;

    /// Primary key column
    const PK: &'static str;

    fn from_row(row: Row) -> Self;

    fn row(&self) -> &Row;

    fn row_mut(&mut self) -> &mut Row;

    fn into_row(self) -> Row;

    /// Root node for queries on this record's table.
    fn node() -> Node {
        Node::table(Self::TABLE, Self::PK)
    }

    /// A new, unsaved record.
    fn new_record() -> Self {
        Self::from_row(Row::new(Self::TABLE, Self::PK))
    }

    /// Primary key as text. Fails before the record was inserted.
    fn pk_string(&self) -> Result<String> {
        self.row().pk_string()
    }

    fn pk(&self) -> Option<&Value> {
        self.row().pk()
    }

    /// Inserts or updates the record and its joined records.
    #[allow(async_fn_in_trait)]
    async fn save(&mut self, db: &Db, cx: &mut Context) -> Result<()> {
        self.row_mut().save(db, cx).await
    }

    /// Deletes the record. Dependent rows follow their foreign key's delete
    /// action. The in-memory record is invalidated.
    #[allow(async_fn_in_trait)]
    async fn delete(&mut self, db: &Db, cx: &mut Context) -> Result<()> {
        self.row_mut().delete(db, cx).await
    }

    fn to_json(&self, schema: &Schema) -> Result<serde_json::Value> {
        json::to_value(self.row(), schema)
    }

    fn from_json(value: &serde_json::Value, schema: &Schema) -> Result<Self> {
        Ok(Self::from_row(json::from_value(Self::TABLE, value, schema)?))
    }
}
