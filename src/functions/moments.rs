use crate::functions::{
    Aggregate, AggregationError, AggregationFunction, Input, OnlineAggregation, StatefulAverage,
    StatefulVarianceEstimator,
};
use serde::{Deserialize, Serialize};

/// Shared machinery of the central moment estimators.
///
/// The mean and the second moment come from nested [`StatefulAverage`] and
/// [`StatefulVarianceEstimator`] instances; the third and fourth sums of
/// powered deviations are updated incrementally from the values those held
/// before the new observation:
///
/// ```text
/// d = x - mean, dn = d / n, t = d * dn * (n - 1)
/// M4 += t * dn^2 * (n^2 - 3n + 3) + 6 dn^2 M2 - 4 dn M3
/// M3 += t * dn * (n - 2) - 3 dn M2
/// ```
#[derive(Debug, Default, Clone)]
struct CentralMoments {
    average: StatefulAverage,
    mean: Aggregate<f64>,
    variance: StatefulVarianceEstimator,
    spread: Aggregate<f64>,
    m3: f64,
    m4: f64,
}

/// Observations needed before the moments are reported: one to prime the
/// average, one more to prime the variance.
const WARM_UP: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentsSnapshot {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
    pub m3: f64,
    pub m4: f64,
}

impl CentralMoments {
    fn count(&self) -> u64 {
        self.variance.count()
    }

    fn push(&mut self, x: f64) -> Result<(), AggregationError> {
        let n1 = self.count() as f64;
        let n = n1 + 1.0;
        let mean = self.mean.value().copied().unwrap_or(x);
        let m2 = self.variance.accumulator();

        let d = x - mean;
        let dn = d / n;
        let dn2 = dn * dn;
        let t = d * dn * n1;
        self.m4 += t * dn2 * (n * n - 3.0 * n + 3.0) + 6.0 * dn2 * m2 - 4.0 * dn * self.m3;
        self.m3 += t * dn * (n - 2.0) - 3.0 * dn * m2;

        self.mean = self.average.invoke(self.mean, Input::Value(x))?;
        self.spread = self.variance.invoke(self.spread, Input::Value(x))?;
        Ok(())
    }

    fn third(&self) -> f64 {
        self.m3 / self.count() as f64
    }

    fn fourth(&self) -> f64 {
        self.m4 / self.count() as f64
    }

    fn step(
        &mut self,
        state_is_fresh: bool,
        x: f64,
        order: fn(&Self) -> f64,
    ) -> Result<Aggregate<f64>, AggregationError> {
        if state_is_fresh {
            *self = Self::default();
        }
        self.push(x)?;
        if self.count() <= WARM_UP {
            Ok(Aggregate::WarmingUp)
        } else {
            Ok(Aggregate::Ready(order(self)))
        }
    }

    fn snapshot(&self) -> MomentsSnapshot {
        MomentsSnapshot {
            count: self.count(),
            mean: self.mean.value().copied().unwrap_or(0.0),
            m2: self.variance.accumulator(),
            m3: self.m3,
            m4: self.m4,
        }
    }

    fn restore(&mut self, s: MomentsSnapshot) -> Result<(), AggregationError> {
        if s.m2 < 0.0 || s.m4 < 0.0 {
            return Err(AggregationError::InvalidArgument(
                "even central sums must not be negative".into(),
            ));
        }
        let mut restored = Self::default();
        if s.count > 0 {
            restored.average.restore(crate::functions::AverageSnapshot { count: s.count })?;
            restored.mean = Aggregate::Ready(s.mean);
            restored.variance.restore(crate::functions::VarianceSnapshot {
                count: s.count,
                sum: s.mean * s.count as f64,
                accumulator: s.m2,
            })?;
            restored.spread = Aggregate::Ready(restored.variance.accumulator());
            restored.m3 = s.m3;
            restored.m4 = s.m4;
        }
        *self = restored;
        Ok(())
    }
}

/// Population third central moment `M3 / n`.
///
/// Warms up over the first two values and reports from the third on.
#[derive(Debug, Default, Clone)]
pub struct ThirdCentralMomentEstimator {
    moments: CentralMoments,
}

impl ThirdCentralMomentEstimator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Into<f64>> AggregationFunction<T> for ThirdCentralMomentEstimator {
    type State = f64;

    fn invoke(
        &mut self,
        state: Aggregate<f64>,
        next: Input<T>,
    ) -> Result<Aggregate<f64>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        self.moments.step(state.is_uninitialized(), x.into(), CentralMoments::third)
    }
}

impl OnlineAggregation for ThirdCentralMomentEstimator {
    type Snapshot = MomentsSnapshot;

    fn snapshot(&self) -> MomentsSnapshot {
        self.moments.snapshot()
    }

    fn restore(&mut self, snapshot: MomentsSnapshot) -> Result<(), AggregationError> {
        self.moments.restore(snapshot)
    }
}

/// Population fourth central moment `M4 / n`, with the same warm-up as
/// [`ThirdCentralMomentEstimator`].
#[derive(Debug, Default, Clone)]
pub struct FourthCentralMomentEstimator {
    moments: CentralMoments,
}

impl FourthCentralMomentEstimator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Into<f64>> AggregationFunction<T> for FourthCentralMomentEstimator {
    type State = f64;

    fn invoke(
        &mut self,
        state: Aggregate<f64>,
        next: Input<T>,
    ) -> Result<Aggregate<f64>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        self.moments.step(state.is_uninitialized(), x.into(), CentralMoments::fourth)
    }
}

impl OnlineAggregation for FourthCentralMomentEstimator {
    type Snapshot = MomentsSnapshot;

    fn snapshot(&self) -> MomentsSnapshot {
        self.moments.snapshot()
    }

    fn restore(&mut self, snapshot: MomentsSnapshot) -> Result<(), AggregationError> {
        self.moments.restore(snapshot)
    }
}
