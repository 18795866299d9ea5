use crate::logging_driver::DriverOp;
use quarry_core::{
    driver::{operation::Transaction, Operation, Response},
    schema::{Dialect, Schema},
    stmt::{Statement, Value},
};
use quarry_sql::Serializer;
use std::sync::{Arc, Mutex};

/// A wrapper around the operations log that provides a clean API for tests
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
    schema: Arc<Schema>,
    dialect: Dialect,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<DriverOp>>>, schema: Arc<Schema>, dialect: Dialect) -> Self {
        Self {
            ops,
            schema,
            dialect,
        }
    }

    /// Get the number of logged operations
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Check if any operation matches the given predicate
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .any(|op| predicate(&op.operation))
    }

    /// Count operations matching the given predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(&op.operation))
            .count()
    }

    pub fn has_insert(&self) -> bool {
        self.any(|op| matches!(op, Operation::Insert(_)))
    }

    pub fn has_query_sql(&self) -> bool {
        self.any(|op| matches!(op, Operation::QuerySql(_)))
    }

    pub fn has_transaction(&self, expected: Transaction) -> bool {
        self.any(|op| matches!(op, Operation::Transaction(t) if *t == expected))
    }

    /// Clear the log
    pub fn clear(&mut self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first operation from the log
    pub fn pop(&mut self) -> Option<(Operation, Response)> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            let driver_op = ops.remove(0);
            Some((driver_op.operation, driver_op.response))
        }
    }

    /// Every logged operation rendered as the SQL a driver would send.
    pub fn sql(&self) -> Vec<String> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .map(|op| self.render(&op.operation).0)
            .collect()
    }

    /// The SQL and bound arguments of operation `index`.
    pub fn statement(&self, index: usize) -> (String, Vec<Value>) {
        let ops = self.ops.lock().unwrap();
        self.render(&ops[index].operation)
    }

    /// Get access to all operations for custom assertions
    pub fn with_ops<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[DriverOp]) -> R,
    {
        let ops = self.ops.lock().unwrap();
        f(&ops)
    }

    fn render(&self, operation: &Operation) -> (String, Vec<Value>) {
        let serializer = Serializer::for_dialect(&self.schema, self.dialect);

        let mut params = Vec::<Value>::new();
        let sql = match operation {
            Operation::Insert(insert) => {
                let stmt = Statement::Insert(insert.stmt.clone());
                serializer.serialize(&stmt, &mut params)
            }
            Operation::QuerySql(query) => serializer.serialize(&query.stmt, &mut params),
            Operation::Transaction(op) => Ok(serializer.serialize_transaction(*op)),
        };

        (sql.unwrap_or_else(|err| format!("<{err}>")), params)
    }
}
