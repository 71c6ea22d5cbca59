//! Error types for buffer operations.

use crate::position::LineStart;
use thiserror::Error;

/// Errors returned by the chunked buffer and its cursor engine.
///
/// `PoolExhausted`, `OutOfRange` and `LineOutOfRange` are ordinary,
/// recoverable conditions. `InconsistentState` means a structural invariant
/// was broken and should be treated as a bug by the caller.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Every chunk in the pool is in use; the operation was not applied.
    #[error("chunk pool exhausted: all {chunks} chunks in use")]
    PoolExhausted {
        /// Total chunks in the pool.
        chunks: usize,
    },

    /// An absolute offset lies beyond the end of the buffer.
    #[error("offset {offset} out of range for buffer of {size} bytes")]
    OutOfRange {
        /// Requested offset.
        offset: usize,
        /// Buffer size at the time of the request.
        size: usize,
    },

    /// The buffer has fewer lines than requested.
    ///
    /// `fallback` is the end-of-buffer position. It is not the requested line.
    #[error("line {line} out of range: buffer has {lines} lines")]
    LineOutOfRange {
        /// Requested line.
        line: usize,
        /// Number of lines in the buffer.
        lines: usize,
        /// End-of-buffer position.
        fallback: LineStart,
    },

    /// A structural invariant was violated.
    #[error("inconsistent buffer state: {0}")]
    InconsistentState(&'static str),

    /// The configuration cannot describe a usable pool.
    #[error("invalid buffer configuration: {0}")]
    InvalidConfig(&'static str),

    /// Reading or writing buffer contents failed.
    #[error("buffer I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BufferError>;
