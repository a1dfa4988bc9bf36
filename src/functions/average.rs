use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input, OnlineAggregation};
use serde::{Deserialize, Serialize};

/// Incremental mean `avg' = ((n - 1) * avg + x) / n`.
///
/// The previous average travels in the state; only the count `n` is kept
/// here.
#[derive(Debug, Default, Clone)]
pub struct StatefulAverage {
    count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageSnapshot {
    pub count: u64,
}

impl StatefulAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<T: Into<f64>> AggregationFunction<T> for StatefulAverage {
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
        match state {
            Aggregate::Ready(avg) if self.count > 0 => {
                self.count += 1;
                let n = self.count as f64;
                Ok(Aggregate::Ready(((n - 1.0) * avg + x) / n))
            }
            _ => {
                self.count = 1;
                Ok(Aggregate::Ready(x))
            }
        }
    }
}

impl OnlineAggregation for StatefulAverage {
    type Snapshot = AverageSnapshot;

    fn snapshot(&self) -> AverageSnapshot {
        AverageSnapshot { count: self.count }
    }

    fn restore(&mut self, snapshot: AverageSnapshot) -> Result<(), AggregationError> {
        self.count = snapshot.count;
        Ok(())
    }
}
