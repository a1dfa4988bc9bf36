use crate::functions::{
    Aggregate, AggregationError, AggregationFunction, Input, OnlineAggregation,
    StatefulVarianceEstimator, VarianceSnapshot, VarianceState,
};

/// Square root of [`StatefulVarianceEstimator`].
#[derive(Debug, Default, Clone)]
pub struct StatefulStandardDeviation {
    variance: StatefulVarianceEstimator,
}

impl StatefulStandardDeviation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Into<f64>> AggregationFunction<T> for StatefulStandardDeviation {
    type State = f64;

    fn invoke(
        &mut self,
        state: Aggregate<f64>,
        next: Input<T>,
    ) -> Result<Aggregate<f64>, AggregationError> {
        if matches!(next, Input::Skip) {
            return Ok(state);
        }
        let variance = self.variance.invoke(state.map(|sd| sd * sd), next)?;
        Ok(variance.map(f64::sqrt))
    }
}

impl OnlineAggregation for StatefulStandardDeviation {
    type Snapshot = VarianceSnapshot;

    fn snapshot(&self) -> VarianceSnapshot {
        self.variance.snapshot()
    }

    fn restore(&mut self, snapshot: VarianceSnapshot) -> Result<(), AggregationError> {
        self.variance.restore(snapshot)
    }
}

/// Running standard deviation whose state is the Welford accumulator.
#[derive(Debug, Default, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StandardDeviationState(pub VarianceState);

impl StandardDeviationState {
    pub fn value(&self) -> f64 {
        self.0.std_dev()
    }
}

/// Stateless standard deviation.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDeviation;

impl StandardDeviation {
    pub fn new() -> Self {
        StandardDeviation
    }
}

impl<T: Into<f64>> AggregationFunction<T> for StandardDeviation {
    type State = StandardDeviationState;

    fn invoke(
        &mut self,
        state: Aggregate<StandardDeviationState>,
        next: Input<T>,
    ) -> Result<Aggregate<StandardDeviationState>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        let mut acc = state.into_value().map(|s| s.0).unwrap_or_default();
        acc.push(x.into());
        Ok(Aggregate::Ready(StandardDeviationState(acc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DATA: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn stateful_is_sqrt_of_sample_variance() {
        let state = StatefulStandardDeviation::new().fold_all(DATA).unwrap();
        assert_relative_eq!(state.into_value().unwrap(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn stateless_matches_stateful() {
        let a = StatefulStandardDeviation::new().fold_all(DATA).unwrap().into_value().unwrap();
        let b = StandardDeviation::new().fold_all(DATA).unwrap().into_value().unwrap();
        assert_relative_eq!(a, b.value(), epsilon = 1e-12);
    }

    #[test]
    fn skip_keeps_state() {
        let mut sd = StatefulStandardDeviation::new();
        let state = sd.fold_all([1.0, 3.0]).unwrap();
        let again = sd.invoke(state, Input::<f64>::Skip).unwrap();
        assert_eq!(state, again);
        assert_eq!(sd.snapshot().count, 2);
    }
}
