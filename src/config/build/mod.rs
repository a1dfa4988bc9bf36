mod error;
mod estimators;

pub use error::BuildError;
pub use estimators::{BoxedEstimator, build_estimator};
