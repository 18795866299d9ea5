use crate::{materialize, Context, Db, Record, Row};

use quarry_core::{
    node::{ops, Node, Sort},
    schema::ColumnType,
    stmt::{Count, Statement, Value},
    Result,
};

use std::{fmt, marker::PhantomData};

/// Query builder for one record type.
///
/// Builders are plain data: nothing is validated until the query is
/// planned by `load`, `count`, `delete` or `get`.
pub struct Query<R> {
    pub(crate) untyped: quarry_core::Query,
    _p: PhantomData<fn() -> R>,
}

impl<R: Record> Query<R> {
    /// Selects every record of `R`'s table.
    pub fn new() -> Self {
        Self::from_untyped(quarry_core::Query::new(R::node()))
    }

    pub fn from_untyped(untyped: quarry_core::Query) -> Self {
        Query {
            untyped,
            _p: PhantomData,
        }
    }

    pub fn untyped(&self) -> &quarry_core::Query {
        &self.untyped
    }

    pub fn into_untyped(self) -> quarry_core::Query {
        self.untyped
    }

    /// Loads the records reached through `node` with each result.
    pub fn join(mut self, node: impl Into<Node>) -> Self {
        self.untyped.join(node);
        self
    }

    /// Like `join`, adding `condition` to the join predicate.
    pub fn join_on(mut self, node: impl Into<Node>, condition: impl Into<Node>) -> Self {
        self.untyped.join_on(node, condition);
        self
    }

    pub fn select(mut self, columns: impl IntoIterator<Item = Node>) -> Self {
        self.untyped.select(columns);
        self
    }

    pub fn filter(mut self, node: impl Into<Node>) -> Self {
        self.untyped.filter(node);
        self
    }

    pub fn having(mut self, node: impl Into<Node>) -> Self {
        self.untyped.having(node);
        self
    }

    pub fn group_by(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.untyped.group_by(nodes);
        self
    }

    pub fn order_by(mut self, sorts: impl IntoIterator<Item = impl Into<Sort>>) -> Self {
        self.untyped.order_by(sorts.into_iter().map(Into::into));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.untyped.distinct();
        self
    }

    pub fn limit(mut self, max: u64, offset: u64) -> Self {
        self.untyped.limit(max, offset);
        self
    }

    /// Adds a computed column, read back with `Row::alias`.
    pub fn alias(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.untyped.alias(name, node);
        self
    }

    /// Repeats each parent once per record of the collection edge `node`
    /// instead of folding the records into it.
    pub fn expand(mut self, node: impl Into<Node>) -> Self {
        self.untyped.expand(node);
        self
    }

    pub async fn load(self, db: &Db, cx: &mut Context) -> Result<Vec<R>> {
        let rows = self.load_untyped(db, cx).await?;
        Ok(rows.into_iter().map(R::from_row).collect())
    }

    /// Loads the results as untyped rows.
    pub async fn load_untyped(self, db: &Db, cx: &mut Context) -> Result<Vec<Row>> {
        let plan = self.untyped.plan(db.schema())?;
        let ret = plan.ret();
        let records = db.query(cx, Statement::from(plan.clone()), ret).await?;
        materialize::fold(&plan, records)
    }

    /// Counts the matching rows, or the distinct values of `nodes`.
    pub async fn count(
        self,
        db: &Db,
        cx: &mut Context,
        distinct: bool,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Result<u64> {
        let count = Count::new(
            &self.untyped,
            db.schema(),
            distinct,
            nodes.into_iter().collect(),
        )?;

        let records = db
            .query(cx, count.into(), vec![Some(ColumnType::Int64)])
            .await?;

        match records.first() {
            Some(record) if !record.is_empty() => record[0].to_u64(),
            _ => Ok(0),
        }
    }

    /// Deletes the root records matched by the filter. Referential actions
    /// are left to the database.
    pub async fn delete(self, db: &Db, cx: &mut Context) -> Result<u64> {
        let plan = self.untyped.plan(db.schema())?;
        db.execute(cx, Statement::DeleteQuery(Box::new(plan))).await
    }

    /// Loads the record with primary key `id`, or `None` when there is none.
    pub async fn get(self, db: &Db, cx: &mut Context, id: impl Into<Value>) -> Result<Option<R>> {
        let ty = db.schema().column(R::TABLE, R::PK)?.ty;
        let id = id.into().coerce(ty)?;

        let records = self
            .filter(ops::equal(R::node().column(R::PK), id))
            .load(db, cx)
            .await?;
        Ok(records.into_iter().next())
    }
}

impl<R: Record> Default for Query<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Query<R> {
    fn clone(&self) -> Self {
        Query {
            untyped: self.untyped.clone(),
            _p: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.untyped, f)
    }
}
