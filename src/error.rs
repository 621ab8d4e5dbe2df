//! Error types for the heap and the Huffman tree builder.

use thiserror::Error;

/// Error variants for heap, queue and tree operations.
///
/// Every fallible operation either succeeds completely or returns one of
/// these and leaves the structure it was called on exactly as it found it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied argument is unusable (e.g. mismatched slice lengths).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The node arena could not grow.
    #[error("allocation failure: could not reserve {requested} more heap node(s)")]
    AllocationFailure {
        /// Number of additional nodes that were requested.
        requested: usize,
    },

    /// The operation needs more elements than the structure holds.
    #[error("empty structure: need at least {required} element(s), have {available}")]
    EmptyStructure {
        /// Minimum number of elements the operation needs.
        required: usize,
        /// Number of elements actually present.
        available: usize,
    },

    /// Summing two frequencies would overflow.
    #[error("frequency overflow: {left} + {right} does not fit in 64 bits")]
    FrequencyOverflow {
        /// Frequency of the first operand.
        left: u64,
        /// Frequency of the second operand.
        right: u64,
    },

    /// A structural check found the heap in an inconsistent state.
    #[error("heap invariant violated: {0}")]
    InvariantViolation(String),
}

/// A specialized Result type for heap and Huffman operations.
pub type Result<T> = std::result::Result<T, Error>;
