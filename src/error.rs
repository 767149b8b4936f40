//! Error types for the cache client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by a backing-store client.
///
/// The engine never retries or rewrites these; they reach the caller as-is
/// inside [`CacheError::Store`] or [`CacheError::Batch`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store answered with something the client did not understand
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// An operation was applied to a key holding a different kind of value
    #[error("Wrong type for key: {0}")]
    WrongType(String),
}

// == Cache Error Enum ==
/// Unified error type for cache and memoization operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Caller mistake detected before any store I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single store call failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A pipelined submission failed
    #[error("Batch of {ops} operations failed: {source}")]
    Batch {
        /// Number of operations that were queued in the batch
        ops: usize,
        #[source]
        source: StoreError,
    },
}

impl CacheError {
    /// Returns the underlying store failure, if this error came from the store.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            CacheError::Store(err) | CacheError::Batch { source: err, .. } => Some(err),
            CacheError::Configuration(_) => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache client.
pub type Result<T> = std::result::Result<T, CacheError>;
