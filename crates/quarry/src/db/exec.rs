use super::Db;
use crate::Context;

use quarry_core::{
    driver::{
        operation::{self, Operation},
        Connection, Response,
    },
    err,
    schema::{ColumnType, Description},
    stmt::{Delete, Filter, Insert, Statement, Value, ValueRecord},
    Error, Result,
};

use tracing::{debug, trace};

impl Db {
    /// Runs a statement that returns rows, scanning each column as the
    /// matching entry of `ret`.
    pub async fn query(
        &self,
        cx: &mut Context,
        stmt: Statement,
        ret: Vec<Option<ColumnType>>,
    ) -> Result<Vec<ValueRecord>> {
        let op = operation::QuerySql {
            stmt,
            ret: Some(ret),
        };
        self.exec(cx, op.into()).await?.rows.into_values()
    }

    /// Runs a statement for its side effect, returning the number of rows
    /// it affected.
    pub async fn execute(&self, cx: &mut Context, stmt: Statement) -> Result<u64> {
        let op = operation::QuerySql { stmt, ret: None };
        self.exec(cx, op.into()).await?.rows.into_count()
    }

    /// Inserts a row. When `returning` names a generated key column, its new
    /// value is returned.
    pub async fn insert(
        &self,
        cx: &mut Context,
        mut stmt: Insert,
        returning: Option<(&str, ColumnType)>,
    ) -> Result<Option<Value>> {
        let ret = returning.map(|(column, ty)| {
            stmt.returning = Some(column.to_string());
            ty
        });

        let response = self
            .exec(cx, operation::Insert { stmt, ret }.into())
            .await?;

        if ret.is_none() {
            response.rows.into_count()?;
            return Ok(None);
        }

        let mut records = response.rows.into_values()?;
        let value = records
            .pop()
            .and_then(|record| record.into_vec().into_iter().next())
            .ok_or_else(|| err!("insert returned no generated key"))?;
        Ok(Some(value))
    }

    /// Replaces the rows of an association table linking `value_a` with
    /// exactly one row per element of `values_b`.
    pub async fn associate(
        &self,
        cx: &mut Context,
        table: &str,
        column_a: &str,
        value_a: &Value,
        column_b: &str,
        values_b: impl IntoIterator<Item = Value>,
    ) -> Result<()> {
        let filter = Filter::eq(column_a, value_a.clone());
        self.execute(cx, Statement::Delete(Delete::new(table, filter)))
            .await?;

        for value_b in values_b {
            let insert = Insert::new(table)
                .value(column_a, value_a.clone())
                .value(column_b, value_b);
            self.insert(cx, insert, None).await?;
        }
        Ok(())
    }

    /// Sends one operation through the context's connection for this
    /// database, racing the context's cancellation.
    pub(crate) async fn exec(&self, cx: &mut Context, op: Operation) -> Result<Response> {
        if let Operation::QuerySql(op) = &op {
            trace!(database = %self.key, statement = op.stmt.name(), "exec");
        }

        let mut conn = self.checkout(cx).await?;
        let signal = cx.signal();

        let res = tokio::select! {
            res = conn.exec(&self.schema, op) => Some(res),
            _ = signal.cancelled() => None,
        };

        self.checkin(cx, conn, res)
    }

    pub(crate) async fn describe_raw(&self, cx: &mut Context) -> Result<Description> {
        let mut conn = self.checkout(cx).await?;
        let signal = cx.signal();

        let res = tokio::select! {
            res = conn.describe() => Some(res),
            _ = signal.cancelled() => None,
        };

        self.checkin(cx, conn, res)
    }

    /// Takes the context's connection, opening one on first use.
    async fn checkout(&self, cx: &mut Context) -> Result<Box<dyn Connection>> {
        cx.check()?;

        let scope = cx.scope(&self.key);
        if scope.aborted {
            return Err(Error::cancelled());
        }
        if let Some(conn) = scope.conn.take() {
            return Ok(conn);
        }

        let signal = cx.signal();
        tokio::select! {
            conn = self.driver.connect() => conn,
            _ = signal.cancelled() => Err(Error::cancelled()),
        }
    }

    /// Returns the connection to the context. A cancelled call drops it,
    /// which aborts any transaction it carried.
    fn checkin<T>(
        &self,
        cx: &mut Context,
        conn: Box<dyn Connection>,
        res: Option<Result<T>>,
    ) -> Result<T> {
        let scope = cx.scope(&self.key);

        match res {
            Some(res) => {
                scope.conn = Some(conn);
                if res.is_err() && scope.depth > 0 {
                    scope.failed = true;
                }
                res
            }
            None => {
                drop(conn);
                if scope.depth > 0 {
                    scope.failed = true;
                    scope.aborted = true;
                }
                debug!(database = %self.key, "driver call cancelled; connection closed");
                Err(Error::cancelled())
            }
        }
    }
}
