use crate::functions::AggregationError;
use thiserror::Error;

/// Failures raised by cursors and the queues built on the same protocol.
///
/// Every variant is reported at the call that violated the contract; nothing
/// is retried internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CursorError {
    #[error("cursor is closed")]
    Closed,

    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    #[error("no such element")]
    NoSuchElement,

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("underlying structure changed (expected version {expected}, found {found})")]
    ConcurrentModification { expected: u64, found: u64 },

    #[error("capacity of {capacity} elements exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}
