use std::fmt::{Debug, Display, Formatter};
use std::io;
use thiserror::Error;

/// Why a queue operation did not complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("could not acquire the queue lock before the deadline")]
    LockAcquisitionFailed,
    #[error("queue stayed full for the whole timeout")]
    Full,
    #[error("queue stayed empty for the whole timeout")]
    Empty,
    #[error("queue is closed")]
    Closed,
}

impl QueueError {
    /// `true` for backpressure outcomes a caller may simply try again on.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, QueueError::Closed)
    }
}

pub type QueueResult<T> = Result<T, QueueError>;

/// A failed insert. The rejected value is handed back untouched.
pub struct InsertError<T> {
    value: T,
    kind: QueueError,
}

impl<T> InsertError<T> {
    pub(crate) fn new(value: T, kind: QueueError) -> Self {
        Self { value, kind }
    }

    pub fn kind(&self) -> QueueError {
        self.kind
    }

    /// Take back the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.value
    }
}

// Manual impls so callers can use `?` without requiring `T: Debug`.
impl<T> Debug for InsertError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> Display for InsertError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "insert rejected: {}", self.kind)
    }
}

impl<T> std::error::Error for InsertError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<T> From<InsertError<T>> for QueueError {
    fn from(err: InsertError<T>) -> Self {
        err.kind
    }
}

/// Problems building a queue from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("queue capacity must be positive")]
    ZeroCapacity,
    #[error("queue name must not be empty")]
    EmptyName,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid queue config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_is_the_only_terminal_kind() {
        assert!(QueueError::LockAcquisitionFailed.is_retryable());
        assert!(QueueError::Full.is_retryable());
        assert!(QueueError::Empty.is_retryable());
        assert!(!QueueError::Closed.is_retryable());
    }

    #[test]
    fn insert_error_returns_value_and_kind() {
        struct Opaque(u8);
        let err = InsertError::new(Opaque(7), QueueError::Full);
        assert_eq!(err.kind(), QueueError::Full);
        assert_eq!(err.to_string(), "insert rejected: queue stayed full for the whole timeout");
        assert!(format!("{err:?}").contains("Full"));
        assert_eq!(err.into_inner().0, 7);
    }

    #[test]
    fn insert_error_converts_into_queue_error() {
        let err: QueueError = InsertError::new("x", QueueError::Closed).into();
        assert_eq!(err, QueueError::Closed);
    }
}
