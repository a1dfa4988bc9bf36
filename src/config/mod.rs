//! Serializable estimator configuration and the layer that builds it.

pub mod build;
pub mod choices;

pub use build::{BoxedEstimator, BuildError, build_estimator};
pub use choices::{
    Choice, EstimatorChoice, EstimatorKind, LastNthAverageParameters, NoParams,
    ReservoirParameters, SumEstimatorParameters,
};
