//! Error type returned by fallible table lookups

use thiserror::Error;

/// Errors reported by [`LinearHashMap`](crate::LinearHashMap) operations.
///
/// A failed lookup never changes the table, so every variant is recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// The requested key is not stored in the table
    #[error("key not found")]
    NotFound,
}
