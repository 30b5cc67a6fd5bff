//! Error types for sage-vector.

use thiserror::Error;

/// Result type for sage-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sage-vector operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Collection not found.
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    /// Dimension mismatch between a vector and the collection's established
    /// dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension established by the collection's first insert.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// Invalid vector (empty, or contains NaN/Inf).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
