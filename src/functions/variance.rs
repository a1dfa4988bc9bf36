use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input, OnlineAggregation};
use serde::{Deserialize, Serialize};

/// One-pass sample variance after West and Chan, Golub & LeVeque.
///
/// Keeps the running sum `sk` and the accumulator
/// `vk = sum((x_i - mean_k)^2)`, updated as
/// `vk += (k * x_k - sk)^2 / (k * (k - 1))` once `sk` includes `x_k`.
/// Reports `0` after the first value and `vk / (k - 1)` afterwards.
#[derive(Debug, Default, Clone)]
pub struct StatefulVarianceEstimator {
    count: u64,
    sk: f64,
    vk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceSnapshot {
    pub count: u64,
    pub sum: f64,
    pub accumulator: f64,
}

impl StatefulVarianceEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of squared deviations from the running mean.
    pub fn accumulator(&self) -> f64 {
        self.vk
    }

    pub(crate) fn push(&mut self, x: f64) -> f64 {
        self.count += 1;
        self.sk += x;
        if self.count == 1 {
            self.vk = 0.0;
            return 0.0;
        }
        let k = self.count as f64;
        let d = k * x - self.sk;
        self.vk += d * d / (k * (k - 1.0));
        self.vk / (k - 1.0)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<T: Into<f64>> AggregationFunction<T> for StatefulVarianceEstimator {
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
            self.reset();
        }
        Ok(Aggregate::Ready(self.push(x.into())))
    }
}

impl OnlineAggregation for StatefulVarianceEstimator {
    type Snapshot = VarianceSnapshot;

    fn snapshot(&self) -> VarianceSnapshot {
        VarianceSnapshot {
            count: self.count,
            sum: self.sk,
            accumulator: self.vk,
        }
    }

    fn restore(&mut self, snapshot: VarianceSnapshot) -> Result<(), AggregationError> {
        if snapshot.accumulator < 0.0 {
            return Err(AggregationError::InvalidArgument(
                "variance accumulator must not be negative".into(),
            ));
        }
        self.count = snapshot.count;
        self.sk = snapshot.sum;
        self.vk = snapshot.accumulator;
        Ok(())
    }
}

/// Welford accumulator carried entirely inside the aggregation state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceState {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
}

impl VarianceState {
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Sample variance; `0` below two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Stateless variance: the whole running state lives in [`VarianceState`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Variance;

impl Variance {
    pub fn new() -> Self {
        Variance
    }
}

impl<T: Into<f64>> AggregationFunction<T> for Variance {
    type State = VarianceState;

    fn invoke(
        &mut self,
        state: Aggregate<VarianceState>,
        next: Input<T>,
    ) -> Result<Aggregate<VarianceState>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        let mut acc = state.into_value().unwrap_or_default();
        acc.push(x.into());
        Ok(Aggregate::Ready(acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DATA: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn textbook_sample_variance() {
        let mut est = StatefulVarianceEstimator::new();
        let mut state = Aggregate::Uninitialized;
        for (i, &x) in DATA.iter().enumerate() {
            state = est.invoke(state, Input::Value(x)).unwrap();
            assert!(state.is_ready(), "step {i} must report a value");
        }
        assert_relative_eq!(state.into_value().unwrap(), 32.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn first_value_reports_zero_second_reports_variance() {
        let mut est = StatefulVarianceEstimator::new();
        let state = est.invoke(Aggregate::Uninitialized, Input::Value(2.0)).unwrap();
        assert_eq!(state, Aggregate::Ready(0.0));
        let state = est.invoke(state, Input::Value(4.0)).unwrap();
        assert_relative_eq!(state.into_value().unwrap(), 2.0);
    }

    #[test]
    fn stable_with_large_offset() {
        let mut est = StatefulVarianceEstimator::new();
        let shifted = DATA.map(|x| x + 1e9);
        let state = est.fold_all(shifted).unwrap();
        assert_relative_eq!(state.into_value().unwrap(), 32.0 / 7.0, epsilon = 1e-6);
    }

    #[test]
    fn skip_before_any_value_stays_uninitialized() {
        let mut est = StatefulVarianceEstimator::new();
        let state = est.invoke(Aggregate::Uninitialized, Input::<f64>::Skip).unwrap();
        assert!(state.is_uninitialized());
        assert_eq!(est.count(), 0);
    }

    #[test]
    fn restart_on_uninitialized() {
        let mut est = StatefulVarianceEstimator::new();
        est.fold_all([100.0, -100.0, 50.0]).unwrap();
        let state = est.fold_all(DATA).unwrap();
        assert_relative_eq!(state.into_value().unwrap(), 32.0 / 7.0, epsilon = 1e-12);
        assert_eq!(est.count(), 8);
    }

    #[test]
    fn snapshot_matches_accumulators() {
        let mut est = StatefulVarianceEstimator::new();
        est.fold_all(DATA).unwrap();
        let snap = est.snapshot();
        assert_eq!(snap.count, 8);
        assert_relative_eq!(snap.sum, 40.0);
        assert_relative_eq!(snap.accumulator, 32.0, epsilon = 1e-12);

        let mut other = StatefulVarianceEstimator::new();
        assert!(other.restore(VarianceSnapshot { accumulator: -1.0, ..snap }).is_err());
    }

    #[test]
    fn stateless_variance_agrees_with_stateful() {
        let state = Variance::new().fold_all(DATA).unwrap().into_value().unwrap();
        assert_eq!(state.count, 8);
        assert_relative_eq!(state.mean, 5.0);
        assert_relative_eq!(state.variance(), 32.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(state.population_variance(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn stateless_variance_of_single_value() {
        let state = Variance::new().fold_all([3.0]).unwrap().into_value().unwrap();
        assert_eq!(state.variance(), 0.0);
    }
}
