use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input};
use std::cmp::Ordering;

/// Number of ascending runs in a sequence under a comparator.
///
/// A new run starts whenever a value compares less than its predecessor, so
/// a sorted input yields `1` and every descent adds one. Useful to watch how
/// far a stream is from being sorted.
pub struct NumberOfRuns<T> {
    comparator: Box<dyn Fn(&T, &T) -> Ordering>,
    previous: Option<T>,
}

impl<T: Ord + 'static> NumberOfRuns<T> {
    pub fn natural() -> Self {
        Self::new(T::cmp)
    }
}

impl<T> NumberOfRuns<T> {
    pub fn new<C>(comparator: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            comparator: Box::new(comparator),
            previous: None,
        }
    }
}

impl<T> AggregationFunction<T> for NumberOfRuns<T> {
    type State = u64;

    fn invoke(
        &mut self,
        state: Aggregate<u64>,
        next: Input<T>,
    ) -> Result<Aggregate<u64>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        let runs = match (state, self.previous.as_ref()) {
            (Aggregate::Ready(runs), Some(prev)) => {
                if (self.comparator)(&x, prev) == Ordering::Less {
                    runs + 1
                } else {
                    runs
                }
            }
            _ => 1,
        };
        self.previous = Some(x);
        Ok(Aggregate::Ready(runs))
    }
}
