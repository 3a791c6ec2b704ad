//! Buffer error types

use thiserror::Error;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Error type for buffer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A single offset outside `[0, limit)`
    #[error("index {index} out of range for limit {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A range that is inverted or reaches past the limit
    #[error("range {start}..{end} out of bounds for limit {limit}")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        limit: usize,
    },

    /// Destination cannot take the requested number of bytes
    #[error("need {needed} bytes but only {remaining} remain")]
    InsufficientCapacity { needed: usize, remaining: usize },

    /// Relative put past the limit
    #[error("buffer overflow")]
    BufferOverflow,

    /// Relative get past the limit
    #[error("buffer underflow")]
    BufferUnderflow,

    /// `reset` without a mark
    #[error("mark is not set")]
    InvalidMark,

    /// The global allocator refused a direct region
    #[error("failed to allocate direct buffer of {capacity} bytes")]
    Allocation { capacity: usize },
}

impl BufferError {
    /// True for every addressing failure: bad offset, bad range, or a
    /// destination too small to hold a range.
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(
            self,
            BufferError::IndexOutOfRange { .. }
                | BufferError::RangeOutOfBounds { .. }
                | BufferError::InsufficientCapacity { .. }
        )
    }
}
