//! Aggregation functions: one fold step `(state, next) -> state` each.

mod aggregation;
mod average;
pub mod checkpoint;
mod count;
mod error;
mod extremum;
mod last_nth_average;
mod moments;
mod number_of_runs;
pub mod reservoir;
mod standard_deviation;
mod sum;
mod sum_estimator;
mod variance;

pub use aggregation::{Aggregate, AggregationFunction, Input, OnlineAggregation};
pub use average::{AverageSnapshot, StatefulAverage};
pub use count::Count;
pub use error::AggregationError;
pub use extremum::{Maximum, Minimum};
pub use last_nth_average::{LastNthAverage, LastNthSnapshot};
pub use moments::{FourthCentralMomentEstimator, MomentsSnapshot, ThirdCentralMomentEstimator};
pub use number_of_runs::NumberOfRuns;
pub use reservoir::{ReservoirSample, ReservoirStrategyKind};
pub use standard_deviation::{StandardDeviation, StandardDeviationState, StatefulStandardDeviation};
pub use sum::Sum;
pub use sum_estimator::{OverflowPolicy, SumEstimator, SumEstimatorSnapshot};
pub use variance::{StatefulVarianceEstimator, Variance, VarianceSnapshot, VarianceState};
