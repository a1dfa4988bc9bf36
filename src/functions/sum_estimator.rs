use crate::functions::{
    Aggregate, AggregationError, AggregationFunction, Input, OnlineAggregation, StatefulAverage,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

/// What [`SumEstimator`] does once more values arrive than the declared
/// entirety size.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Fail with [`AggregationError::EntiretyExceeded`].
    #[default]
    Restrictive,
    /// Grow the entirety size to the observed count.
    Adaptive,
    /// Keep extrapolating with the declared size.
    Quiet,
}

/// Estimates the total of a population of known size `N` from a running
/// average: `N * average`.
#[derive(Debug, Clone)]
pub struct SumEstimator {
    declared: u64,
    entirety: u64,
    policy: OverflowPolicy,
    count: u64,
    average: StatefulAverage,
    mean: Aggregate<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumEstimatorSnapshot {
    pub entirety: u64,
    pub count: u64,
    pub mean: f64,
}

impl SumEstimator {
    pub fn new(entirety: u64, policy: OverflowPolicy) -> Result<Self, AggregationError> {
        if entirety == 0 {
            return Err(AggregationError::InvalidArgument(
                "entirety size must be positive".into(),
            ));
        }
        Ok(Self {
            declared: entirety,
            entirety,
            policy,
            count: 0,
            average: StatefulAverage::new(),
            mean: Aggregate::Uninitialized,
        })
    }

    /// Current entirety size; may exceed the declared one under
    /// [`OverflowPolicy::Adaptive`].
    pub fn entirety(&self) -> u64 {
        self.entirety
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    fn reset(&mut self) {
        self.entirety = self.declared;
        self.count = 0;
        self.average = StatefulAverage::new();
        self.mean = Aggregate::Uninitialized;
    }
}

impl<T: Into<f64>> AggregationFunction<T> for SumEstimator {
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
        let observed = self.count + 1;
        if observed > self.entirety {
            match self.policy {
                OverflowPolicy::Restrictive => {
                    return Err(AggregationError::EntiretyExceeded {
                        observed,
                        declared: self.entirety,
                    });
                }
                OverflowPolicy::Adaptive => {
                    warn!(observed, declared = self.entirety, "entirety size exceeded, growing it");
                    self.entirety = observed;
                }
                OverflowPolicy::Quiet => {
                    debug!(observed, declared = self.entirety, "entirety size exceeded, ignoring");
                }
            }
        }
        self.count = observed;
        self.mean = self.average.invoke(self.mean, Input::Value(x))?;
        Ok(self.mean.map(|avg| self.entirety as f64 * avg))
    }
}

impl OnlineAggregation for SumEstimator {
    type Snapshot = SumEstimatorSnapshot;

    fn snapshot(&self) -> SumEstimatorSnapshot {
        SumEstimatorSnapshot {
            entirety: self.entirety,
            count: self.count,
            mean: self.mean.value().copied().unwrap_or(0.0),
        }
    }

    fn restore(&mut self, snapshot: SumEstimatorSnapshot) -> Result<(), AggregationError> {
        if snapshot.entirety == 0 {
            return Err(AggregationError::InvalidArgument(
                "entirety size must be positive".into(),
            ));
        }
        self.entirety = snapshot.entirety;
        self.count = snapshot.count;
        self.average.restore(crate::functions::AverageSnapshot { count: snapshot.count })?;
        self.mean = if snapshot.count == 0 {
            Aggregate::Uninitialized
        } else {
            Aggregate::Ready(snapshot.mean)
        };
        Ok(())
    }
}
