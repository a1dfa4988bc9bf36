use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input};

/// Counts the values it is fed.
///
/// Unlike the other functions, a skipped input on an uninitialized state
/// does produce a result: zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct Count;

impl Count {
    pub fn new() -> Self {
        Count
    }
}

impl<T> AggregationFunction<T> for Count {
    type State = u64;

    fn invoke(
        &mut self,
        state: Aggregate<u64>,
        next: Input<T>,
    ) -> Result<Aggregate<u64>, AggregationError> {
        let current = state.into_value();
        Ok(match next {
            Input::Skip => Aggregate::Ready(current.unwrap_or(0)),
            Input::Value(_) => Aggregate::Ready(current.map_or(1, |n| n + 1)),
        })
    }
}
