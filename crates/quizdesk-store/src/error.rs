//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing a results store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A line in the results log could not be decoded.
    #[error("corrupt record at {}:{line}: {reason}", path.display())]
    CorruptRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A writer panicked while holding the store lock.
    #[error("results store lock poisoned")]
    Poisoned,

    /// Sequence numbers are exhausted.
    #[error("sequence number overflow after {0}")]
    SequenceOverflow(u64),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}
