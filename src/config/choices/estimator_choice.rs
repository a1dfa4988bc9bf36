use crate::config::choices::Choice;
use crate::functions::{OverflowPolicy, ReservoirStrategyKind};
use anyhow::Result;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

const DEFAULT_SEED: u64 = 42;
fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_window() -> usize {
    10
}

fn default_entirety() -> u64 {
    100
}

fn default_reservoir_size() -> usize {
    10
}

/// Empty parameter object so every kind still carries "params".
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct NoParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LastNthAverageParameters {
    #[serde(default = "default_window")]
    #[schemars(
        title = "Window",
        description = "Number of most recent values averaged",
        range(min = 1),
        default = "default_window"
    )]
    pub window: usize,
}

impl Default for LastNthAverageParameters {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SumEstimatorParameters {
    #[serde(default = "default_entirety")]
    #[schemars(
        title = "Entirety size",
        description = "Declared number of elements in the whole population",
        range(min = 1),
        default = "default_entirety"
    )]
    pub entirety: u64,

    #[serde(default)]
    #[schemars(
        title = "Overflow policy",
        description = "What to do once more elements than declared arrive"
    )]
    pub policy: OverflowPolicy,
}

impl Default for SumEstimatorParameters {
    fn default() -> Self {
        Self {
            entirety: default_entirety(),
            policy: OverflowPolicy::default(),
        }
    }
}

/// Parameters of a [`ReservoirSample`](crate::functions::ReservoirSample).
///
/// Kept outside [`EstimatorChoice`] because a sample is not a scalar.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ReservoirParameters {
    #[serde(default = "default_reservoir_size")]
    #[schemars(
        title = "Size",
        description = "Number of elements kept in the sample",
        range(min = 1),
        default = "default_reservoir_size"
    )]
    pub size: usize,

    #[serde(default)]
    #[schemars(title = "Strategy", description = "Reservoir sampling algorithm (r, x or z)")]
    pub strategy: ReservoirStrategyKind,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for ReservoirParameters {
    fn default() -> Self {
        Self {
            size: default_reservoir_size(),
            strategy: ReservoirStrategyKind::default(),
            seed: default_seed(),
        }
    }
}

/// Scalar estimators over `f64` values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(EstimatorKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum EstimatorChoice {
    #[strum_discriminants(strum(message = "Sum", detailed_message = "Running total."))]
    Sum(NoParams),

    #[strum_discriminants(strum(message = "Minimum"))]
    Minimum(NoParams),

    #[strum_discriminants(strum(message = "Maximum"))]
    Maximum(NoParams),

    #[strum_discriminants(strum(
        message = "Average",
        detailed_message = "Incremental arithmetic mean."
    ))]
    Average(NoParams),

    #[strum_discriminants(strum(
        message = "Variance",
        detailed_message = "Sample variance, one pass (West / Chan, Golub & LeVeque)."
    ))]
    Variance(NoParams),

    #[strum_discriminants(strum(message = "Standard deviation"))]
    StandardDeviation(NoParams),

    #[strum_discriminants(strum(
        message = "Third central moment",
        detailed_message = "Population third central moment; needs three values."
    ))]
    ThirdCentralMoment(NoParams),

    #[strum_discriminants(strum(
        message = "Fourth central moment",
        detailed_message = "Population fourth central moment; needs three values."
    ))]
    FourthCentralMoment(NoParams),

    #[strum_discriminants(strum(
        message = "Last n average",
        detailed_message = "Average over a sliding window of the most recent values."
    ))]
    LastNthAverage(LastNthAverageParameters),

    #[strum_discriminants(strum(
        message = "Sum estimator",
        detailed_message = "Extrapolates the total of a population of known size."
    ))]
    SumEstimator(SumEstimatorParameters),
}

impl Choice for EstimatorChoice {
    type Kind = EstimatorKind;

    fn schema() -> Schema {
        schema_for!(EstimatorChoice)
    }

    fn default_params(kind: Self::Kind) -> Result<Value> {
        Ok(match kind {
            EstimatorKind::LastNthAverage => {
                serde_json::to_value(LastNthAverageParameters::default())?
            }
            EstimatorKind::SumEstimator => serde_json::to_value(SumEstimatorParameters::default())?,
            _ => serde_json::to_value(NoParams::default())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;
    use strum::{EnumMessage, IntoEnumIterator};

    #[test]
    fn tagged_enum_serialization() {
        let choice = EstimatorChoice::LastNthAverage(LastNthAverageParameters { window: 4 });
        let v = serde_json::to_value(choice).unwrap();
        assert_eq!(v, json!({ "type": "last-nth-average", "params": { "window": 4 } }));
    }

    #[test]
    fn missing_fields_apply_defaults() {
        let p: SumEstimatorParameters = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p, SumEstimatorParameters::default());

        let p: ReservoirParameters = serde_json::from_value(json!({ "strategy": "r" })).unwrap();
        assert_eq!(p.strategy, ReservoirStrategyKind::R);
        assert_eq!(p.seed, DEFAULT_SEED);
        assert_eq!(p.size, 10);
    }

    #[test]
    fn policy_parses_from_kebab_case() {
        let p: SumEstimatorParameters =
            serde_json::from_value(json!({ "entirety": 5, "policy": "adaptive" })).unwrap();
        assert_eq!(p.policy, OverflowPolicy::Adaptive);
        assert_eq!(OverflowPolicy::from_str("quiet").unwrap(), OverflowPolicy::Quiet);
        assert_eq!(OverflowPolicy::Restrictive.to_string(), "restrictive");
    }

    #[test]
    fn kinds_round_trip_through_their_names() {
        for kind in EstimatorKind::iter() {
            let name: &'static str = kind.into();
            assert_eq!(EstimatorKind::from_str(name).unwrap(), kind);
            assert!(kind.get_message().is_some(), "{name} has no label");
        }
        assert_eq!(EstimatorKind::ThirdCentralMoment.to_string(), "third-central-moment");
    }

    #[test]
    fn from_parts_uses_default_params() {
        let params = EstimatorChoice::default_params(EstimatorKind::SumEstimator).unwrap();
        let choice = EstimatorChoice::from_parts(EstimatorKind::SumEstimator, params).unwrap();
        match choice {
            EstimatorChoice::SumEstimator(p) => assert_eq!(p, SumEstimatorParameters::default()),
            other => panic!("unexpected choice {other:?}"),
        }
    }

    #[test]
    fn defaults_cover_every_kind() {
        let all = EstimatorChoice::defaults().unwrap();
        assert_eq!(all.len(), EstimatorKind::iter().count());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err =
            serde_json::from_value::<EstimatorChoice>(json!({ "type": "median", "params": {} }));
        assert!(err.is_err());
    }

    #[test]
    fn schema_lists_every_kind() {
        let schema = serde_json::to_value(EstimatorChoice::schema()).unwrap();
        let text = schema.to_string();
        for kind in EstimatorKind::iter() {
            let name: &'static str = kind.into();
            assert!(text.contains(name), "schema misses {name}");
        }
    }
}
