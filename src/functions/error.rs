use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregationError {
    #[error("observed {observed} elements but the entirety was declared as {declared}")]
    EntiretyExceeded { observed: u64, declared: u64 },

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("checkpoint failed: {0}")]
    Checkpoint(String),
}

impl From<serde_json::Error> for AggregationError {
    fn from(e: serde_json::Error) -> Self {
        AggregationError::Checkpoint(e.to_string())
    }
}
