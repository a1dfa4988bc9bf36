use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input, OnlineAggregation};
use serde::{Deserialize, Serialize};

/// Average of the last `n` values, O(1) per step once warmed up.
///
/// Warms up until `n` values have been seen. Afterwards every value evicts
/// the oldest slot of a ring buffer and the running sum is adjusted by the
/// difference.
#[derive(Debug, Clone)]
pub struct LastNthAverage {
    window: usize,
    values: Vec<f64>,
    position: usize,
    sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastNthSnapshot {
    pub window: usize,
    pub values: Vec<f64>,
    pub position: usize,
}

impl LastNthAverage {
    pub fn new(window: usize) -> Result<Self, AggregationError> {
        if window == 0 {
            return Err(AggregationError::InvalidArgument(
                "window must hold at least one value".into(),
            ));
        }
        Ok(Self {
            window,
            values: Vec::with_capacity(window),
            position: 0,
            sum: 0.0,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    fn clear(&mut self) {
        self.values.clear();
        self.position = 0;
        self.sum = 0.0;
    }
}

impl<T: Into<f64>> AggregationFunction<T> for LastNthAverage {
    type State = f64;

    fn invoke(
        &mut self,
        state: Aggregate<f64>,
        next: Input<T>,
    ) -> Result<Aggregate<f64>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        if state.is_uninitialized() {
            self.clear();
        }
        let x = x.into();
        if self.values.len() < self.window {
            self.values.push(x);
            self.sum += x;
            if self.values.len() < self.window {
                return Ok(Aggregate::WarmingUp);
            }
        } else {
            self.sum += x - self.values[self.position];
            self.values[self.position] = x;
            self.position = (self.position + 1) % self.window;
        }
        Ok(Aggregate::Ready(self.sum / self.window as f64))
    }
}

impl OnlineAggregation for LastNthAverage {
    type Snapshot = LastNthSnapshot;

    fn snapshot(&self) -> LastNthSnapshot {
        LastNthSnapshot {
            window: self.window,
            values: self.values.clone(),
            position: self.position,
        }
    }

    fn restore(&mut self, snapshot: LastNthSnapshot) -> Result<(), AggregationError> {
        if snapshot.window == 0
            || snapshot.values.len() > snapshot.window
            || snapshot.position >= snapshot.window
            || (snapshot.values.len() < snapshot.window && snapshot.position != 0)
        {
            return Err(AggregationError::InvalidArgument(
                "inconsistent last-n snapshot".into(),
            ));
        }
        self.window = snapshot.window;
        self.sum = snapshot.values.iter().sum();
        self.values = snapshot.values;
        self.position = snapshot.position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn warms_up_for_window_values() {
        let mut avg = LastNthAverage::new(3).unwrap();
        let s1 = avg.invoke(Aggregate::Uninitialized, Input::Value(1.0)).unwrap();
        let s2 = avg.invoke(s1, Input::Value(2.0)).unwrap();
        assert_eq!(s1, Aggregate::WarmingUp);
        assert_eq!(s2, Aggregate::WarmingUp);
        let s3 = avg.invoke(s2, Input::Value(3.0)).unwrap();
        assert_eq!(s3, Aggregate::Ready(2.0));
    }

    #[test]
    fn slides_over_the_last_values() {
        let mut avg = LastNthAverage::new(3).unwrap();
        let mut state = Aggregate::Uninitialized;
        let mut seen = Vec::new();
        for x in [1.0, 2.0, 3.0, 4.0, 5.0, 10.0] {
            state = avg.invoke(state, Input::Value(x)).unwrap();
            if let Some(v) = state.value() {
                seen.push(*v);
            }
        }
        assert_eq!(seen.len(), 4);
        assert_relative_eq!(seen[0], 2.0);
        assert_relative_eq!(seen[1], 3.0);
        assert_relative_eq!(seen[2], 4.0);
        assert_relative_eq!(seen[3], 19.0 / 3.0);
    }

    #[test]
    fn window_of_one_tracks_last_value() {
        let mut avg = LastNthAverage::new(1).unwrap();
        assert_eq!(avg.fold_all([4.0, 8.0, -1.0]).unwrap(), Aggregate::Ready(-1.0));
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            LastNthAverage::new(0),
            Err(AggregationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn uninitialized_restarts_warm_up() {
        let mut avg = LastNthAverage::new(2).unwrap();
        avg.fold_all([5.0, 5.0, 5.0]).unwrap();
        let state = avg.invoke(Aggregate::Uninitialized, Input::Value(1.0)).unwrap();
        assert_eq!(state, Aggregate::WarmingUp);
    }

    #[test]
    fn restore_rejects_inconsistent_snapshot() {
        let mut avg = LastNthAverage::new(2).unwrap();
        let bad = LastNthSnapshot {
            window: 2,
            values: vec![1.0, 2.0, 3.0],
            position: 0,
        };
        assert!(avg.restore(bad).is_err());
    }

    #[test]
    fn restore_rejects_offset_while_warming_up() {
        let mut avg = LastNthAverage::new(3).unwrap();
        let bad = LastNthSnapshot {
            window: 3,
            values: vec![1.0, 2.0],
            position: 2,
        };
        assert!(matches!(avg.restore(bad), Err(AggregationError::InvalidArgument(_))));

        let partial = LastNthSnapshot {
            window: 3,
            values: vec![1.0, 2.0],
            position: 0,
        };
        avg.restore(partial).unwrap();
        let state = avg.invoke(Aggregate::WarmingUp, Input::Value(3.0)).unwrap();
        let state = avg.invoke(state, Input::Value(10.0)).unwrap();
        assert_relative_eq!(state.into_value().unwrap(), 5.0);
    }
}
