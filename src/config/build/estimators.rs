use crate::config::build::BuildError;
use crate::config::choices::{
    EstimatorChoice, LastNthAverageParameters, ReservoirParameters, SumEstimatorParameters,
};
use crate::functions::{
    AggregationFunction, FourthCentralMomentEstimator, LastNthAverage, Maximum, Minimum,
    ReservoirSample, StatefulAverage, StatefulStandardDeviation, StatefulVarianceEstimator, Sum,
    SumEstimator, ThirdCentralMomentEstimator,
};
use std::convert::TryFrom;
use tracing::instrument;

pub type BoxedEstimator = Box<dyn AggregationFunction<f64, State = f64>>;

#[instrument(level = "debug")]
pub fn build_estimator(choice: EstimatorChoice) -> Result<BoxedEstimator, BuildError> {
    match choice {
        EstimatorChoice::Sum(_) => Ok(Box::new(Sum::new())),
        EstimatorChoice::Minimum(_) => Ok(Box::new(Minimum)),
        EstimatorChoice::Maximum(_) => Ok(Box::new(Maximum)),
        EstimatorChoice::Average(_) => Ok(Box::new(StatefulAverage::new())),
        EstimatorChoice::Variance(_) => Ok(Box::new(StatefulVarianceEstimator::new())),
        EstimatorChoice::StandardDeviation(_) => Ok(Box::new(StatefulStandardDeviation::new())),
        EstimatorChoice::ThirdCentralMoment(_) => Ok(Box::new(ThirdCentralMomentEstimator::new())),
        EstimatorChoice::FourthCentralMoment(_) => {
            Ok(Box::new(FourthCentralMomentEstimator::new()))
        }
        EstimatorChoice::LastNthAverage(p) => {
            let f = LastNthAverage::try_from(p)?;
            Ok(Box::new(f))
        }
        EstimatorChoice::SumEstimator(p) => {
            let f = SumEstimator::try_from(p)?;
            Ok(Box::new(f))
        }
    }
}

impl TryFrom<LastNthAverageParameters> for LastNthAverage {
    type Error = BuildError;

    fn try_from(parameters: LastNthAverageParameters) -> Result<Self, Self::Error> {
        if parameters.window == 0 {
            return Err(BuildError::InvalidParameter("window must be at least 1".into()));
        }
        LastNthAverage::new(parameters.window).map_err(BuildError::from)
    }
}

impl TryFrom<SumEstimatorParameters> for SumEstimator {
    type Error = BuildError;

    fn try_from(parameters: SumEstimatorParameters) -> Result<Self, Self::Error> {
        if parameters.entirety == 0 {
            return Err(BuildError::InvalidParameter("entirety must be at least 1".into()));
        }
        SumEstimator::new(parameters.entirety, parameters.policy).map_err(BuildError::from)
    }
}

impl<T> TryFrom<ReservoirParameters> for ReservoirSample<T> {
    type Error = BuildError;

    fn try_from(parameters: ReservoirParameters) -> Result<Self, Self::Error> {
        if parameters.size == 0 {
            return Err(BuildError::InvalidParameter("size must be at least 1".into()));
        }
        ReservoirSample::with_kind(parameters.size, parameters.strategy, parameters.seed)
            .map_err(BuildError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::choices::{Choice, EstimatorKind, NoParams};
    use crate::functions::{Aggregate, Input, OverflowPolicy, ReservoirStrategyKind};
    use approx::assert_relative_eq;
    use serde_json::json;
    use strum::IntoEnumIterator;

    const DATA: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 10.0];

    fn run_over(choice: EstimatorChoice, values: &[f64]) -> Aggregate<f64> {
        let mut f = build_estimator(choice).unwrap();
        let mut state = Aggregate::Uninitialized;
        for &x in values {
            state = f.invoke(state, Input::Value(x)).unwrap();
        }
        state
    }

    fn run(choice: EstimatorChoice) -> Aggregate<f64> {
        run_over(choice, &DATA)
    }

    #[test]
    fn builds_every_kind_with_defaults() {
        for kind in EstimatorKind::iter() {
            let params = EstimatorChoice::default_params(kind).unwrap();
            let choice = EstimatorChoice::from_parts(kind, params).unwrap();
            let values: Vec<f64> = (0..20).map(f64::from).collect();
            assert!(run_over(choice, &values).is_ready(), "{kind} not ready");
        }
    }

    #[test]
    fn built_estimators_compute_expected_values() {
        assert_relative_eq!(run(EstimatorChoice::Sum(NoParams {})).into_value().unwrap(), 20.0);
        assert_relative_eq!(run(EstimatorChoice::Maximum(NoParams {})).into_value().unwrap(), 10.0);
        assert_relative_eq!(run(EstimatorChoice::Average(NoParams {})).into_value().unwrap(), 4.0);
        assert_relative_eq!(
            run(EstimatorChoice::Variance(NoParams {})).into_value().unwrap(),
            12.5,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            run(EstimatorChoice::FourthCentralMoment(NoParams {})).into_value().unwrap(),
            278.8,
            epsilon = 1e-9
        );
    }

    #[test]
    fn choice_from_json_builds_window_average() {
        let choice: EstimatorChoice =
            serde_json::from_value(json!({ "type": "last-nth-average", "params": { "window": 2 } }))
                .unwrap();
        assert_relative_eq!(run(choice).into_value().unwrap(), 7.0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let err = build_estimator(EstimatorChoice::LastNthAverage(LastNthAverageParameters {
            window: 0,
        }));
        assert!(matches!(err, Err(BuildError::InvalidParameter(_))));

        let err = SumEstimator::try_from(SumEstimatorParameters {
            entirety: 0,
            policy: OverflowPolicy::Quiet,
        });
        assert!(matches!(err, Err(BuildError::InvalidParameter(_))));

        let err = ReservoirSample::<u8>::try_from(ReservoirParameters {
            size: 0,
            ..ReservoirParameters::default()
        });
        assert!(matches!(err, Err(BuildError::InvalidParameter(_))));
    }

    #[test]
    fn reservoir_from_parameters() {
        let params = ReservoirParameters {
            size: 3,
            strategy: ReservoirStrategyKind::X,
            seed: 7,
        };
        let mut sample = ReservoirSample::<u32>::try_from(params).unwrap();
        assert_eq!(sample.size(), 3);
        let state = sample.fold_all(0..50u32).unwrap();
        assert_eq!(state.into_value().map(|v| v.len()), Some(3));
    }
}
