use super::Operation;
use crate::schema::Dialect;

/// Outermost transaction control. Nesting is tracked by the caller, so a
/// driver only ever sees one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Start,
    Commit,
    Rollback,
}

impl Transaction {
    pub fn sql(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (Transaction::Start, Dialect::Mysql) => "START TRANSACTION",
            (Transaction::Start, Dialect::Postgresql) => "BEGIN",
            (Transaction::Commit, _) => "COMMIT",
            (Transaction::Rollback, _) => "ROLLBACK",
        }
    }
}

impl From<Transaction> for Operation {
    fn from(value: Transaction) -> Self {
        Self::Transaction(value)
    }
}
