use super::Db;
use crate::Context;

use quarry_core::{driver::operation::Transaction, Error, Result};

use tracing::debug;

/// Proof of a `begin` call, consumed by the matching `commit` or
/// `rollback`. It belongs to the context that opened it.
#[derive(Debug)]
#[must_use = "a transaction must be committed or rolled back"]
pub struct TransactionToken {
    context: u64,
    key: String,
    depth: usize,
}

impl Db {
    /// Opens a transaction scope on this database. Nested calls only
    /// increase the depth; the outermost scope owns the real transaction.
    pub async fn begin(&self, cx: &mut Context) -> Result<TransactionToken> {
        let depth = cx.scope(self.key()).depth;

        if depth == 0 {
            self.exec(cx, Transaction::Start.into()).await?;
            let scope = cx.scope(self.key());
            scope.failed = false;
            scope.aborted = false;
        }

        let scope = cx.scope(self.key());
        scope.depth += 1;
        let depth = scope.depth;
        debug!(database = %self.key(), depth, "begin transaction");

        Ok(TransactionToken {
            context: cx.id(),
            key: self.key().to_string(),
            depth,
        })
    }

    /// Closes a scope. Only the outermost commit reaches the database; if
    /// any scope rolled back or a statement failed, it rolls back instead and
    /// returns a `TransactionRollback` error.
    pub async fn commit(&self, cx: &mut Context, token: TransactionToken) -> Result<()> {
        self.check_token(cx, &token)?;

        let scope = cx.scope(self.key());
        scope.depth -= 1;
        debug!(database = %self.key(), depth = scope.depth, failed = scope.failed, "commit transaction");

        if scope.depth > 0 {
            return Ok(());
        }

        if scope.aborted {
            scope.aborted = false;
            scope.failed = false;
            return Err(Error::transaction_rollback());
        }

        if scope.failed {
            scope.failed = false;
            self.finish(cx, Transaction::Rollback).await?;
            return Err(Error::transaction_rollback());
        }

        self.finish(cx, Transaction::Commit).await
    }

    /// Marks the whole transaction failed and closes a scope. The database
    /// rolls back when the outermost scope closes.
    pub async fn rollback(&self, cx: &mut Context, token: TransactionToken) -> Result<()> {
        self.check_token(cx, &token)?;

        let scope = cx.scope(self.key());
        scope.depth -= 1;
        scope.failed = true;
        debug!(database = %self.key(), depth = scope.depth, "rollback transaction");

        if scope.depth > 0 {
            return Ok(());
        }

        scope.failed = false;
        if scope.aborted {
            scope.aborted = false;
            return Ok(());
        }

        self.finish(cx, Transaction::Rollback).await
    }

    /// Ends the database transaction. If that fails the connection is
    /// dropped so the server discards the transaction.
    async fn finish(&self, cx: &mut Context, op: Transaction) -> Result<()> {
        let res = self.exec(cx, op.into()).await;
        if res.is_err() {
            cx.scope(self.key()).conn = None;
        }
        res.map(|_| ())
    }

    /// Runs `f` inside a transaction scope, committing when it returns `Ok`
    /// and rolling back when it returns `Err`.
    pub async fn transaction<O>(
        &self,
        cx: &mut Context,
        f: impl AsyncFnOnce(&mut Context) -> Result<O>,
    ) -> Result<O> {
        let token = self.begin(cx).await?;

        match f(cx).await {
            Ok(value) => {
                self.commit(cx, token).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.rollback(cx, token).await {
                    debug!(database = %self.key(), error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    fn check_token(&self, cx: &mut Context, token: &TransactionToken) -> Result<()> {
        if token.context != cx.id() {
            return Err(Error::invalid_statement(
                "transaction belongs to another context",
            ));
        }
        if token.key != self.key() {
            return Err(Error::invalid_statement(format!(
                "transaction was opened on database `{}`, not `{}`",
                token.key,
                self.key()
            )));
        }

        let depth = cx.scope(self.key()).depth;
        if token.depth != depth {
            return Err(Error::invalid_statement(format!(
                "transaction scopes must close innermost first; closing depth {} while at depth {depth}",
                token.depth
            )));
        }
        Ok(())
    }
}
