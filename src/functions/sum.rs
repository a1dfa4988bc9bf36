use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input};

#[derive(Debug, Default, Clone, Copy)]
pub struct Sum;

impl Sum {
    pub fn new() -> Self {
        Sum
    }
}

impl<T: Into<f64>> AggregationFunction<T> for Sum {
    type State = f64;

    fn invoke(
        &mut self,
        state: Aggregate<f64>,
        next: Input<T>,
    ) -> Result<Aggregate<f64>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        let x = x.into();
        Ok(Aggregate::Ready(match state {
            Aggregate::Ready(sum) => sum + x,
            _ => x,
        }))
    }
}
