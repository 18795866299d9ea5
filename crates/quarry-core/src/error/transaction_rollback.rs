use super::Error;

#[derive(Debug)]
pub(super) struct TransactionRollback;

impl std::error::Error for TransactionRollback {}

impl core::fmt::Display for TransactionRollback {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "transaction rolled back")
    }
}

impl Error {
    /// Returned by the outermost commit of a scope that was marked failed by
    /// an inner rollback. The transaction has been rolled back.
    pub fn transaction_rollback() -> Error {
        Error::from(super::ErrorKind::TransactionRollback(TransactionRollback))
    }

    /// Returns `true` if the transaction scope was rolled back instead of committed.
    pub fn is_transaction_rollback(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::TransactionRollback(_))
    }
}
