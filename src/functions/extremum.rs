use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input};
use std::cmp::Ordering;

/// Smallest value seen so far.
#[derive(Debug, Default, Clone, Copy)]
pub struct Minimum;

/// Largest value seen so far.
#[derive(Debug, Default, Clone, Copy)]
pub struct Maximum;

#[inline]
fn keep<T: PartialOrd>(state: Aggregate<T>, next: Input<T>, wanted: Ordering) -> Aggregate<T> {
    let Input::Value(x) = next else {
        return state;
    };
    match state {
        Aggregate::Ready(current) => match x.partial_cmp(&current) {
            Some(ord) if ord == wanted => Aggregate::Ready(x),
            _ => Aggregate::Ready(current),
        },
        _ => Aggregate::Ready(x),
    }
}

impl<T: PartialOrd> AggregationFunction<T> for Minimum {
    type State = T;

    fn invoke(
        &mut self,
        state: Aggregate<T>,
        next: Input<T>,
    ) -> Result<Aggregate<T>, AggregationError> {
        Ok(keep(state, next, Ordering::Less))
    }
}

impl<T: PartialOrd> AggregationFunction<T> for Maximum {
    type State = T;

    fn invoke(
        &mut self,
        state: Aggregate<T>,
        next: Input<T>,
    ) -> Result<Aggregate<T>, AggregationError> {
        Ok(keep(state, next, Ordering::Greater))
    }
}
