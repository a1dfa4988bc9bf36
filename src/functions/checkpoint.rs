//! JSON checkpoints of [`OnlineAggregation`] snapshots.

use crate::functions::{AggregationError, OnlineAggregation};

pub fn to_json<A: OnlineAggregation + ?Sized>(function: &A) -> Result<String, AggregationError> {
    Ok(serde_json::to_string(&function.snapshot())?)
}

pub fn from_json<A: OnlineAggregation + ?Sized>(
    function: &mut A,
    json: &str,
) -> Result<(), AggregationError> {
    let snapshot: A::Snapshot = serde_json::from_str(json)?;
    function.restore(snapshot)
}
