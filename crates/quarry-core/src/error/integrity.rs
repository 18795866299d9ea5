use super::Error;

/// Error when an operation would violate referential or uniqueness
/// constraints.
///
/// Raised when a dependent row exists under a `RESTRICT` foreign key, or when
/// the database reports a duplicate key or foreign key violation. UI code can
/// match on this kind to message the user.
#[derive(Debug)]
pub(super) struct IntegrityError {
    message: Box<str>,
}

impl std::error::Error for IntegrityError {}

impl core::fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "integrity violation: {}", self.message)
    }
}

impl Error {
    /// Creates an integrity error.
    pub fn integrity(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Integrity(IntegrityError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an integrity violation.
    pub fn is_integrity(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Integrity(_))
    }
}
