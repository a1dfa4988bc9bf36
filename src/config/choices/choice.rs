use anyhow::Result;
use schemars::{JsonSchema, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use strum::{EnumMessage, IntoEnumIterator};

/// Contract for a tagged "choice" enum: `{"type": <kind>, "params": {...}}`.
pub trait Choice: Sized + Serialize + DeserializeOwned + JsonSchema {
    type Kind: Copy + Into<&'static str> + EnumMessage + IntoEnumIterator;

    /// JSON Schema for the whole tagged enum.
    fn schema() -> Schema;

    /// Default `params` JSON for a given kind.
    fn default_params(kind: Self::Kind) -> Result<Value>;

    /// Build the typed enum from kind + params.
    fn from_parts(kind: Self::Kind, params: Value) -> Result<Self> {
        let key: &'static str = kind.into();
        let v = json!({ "type": key, "params": params });
        Ok(serde_json::from_value(v)?)
    }

    /// Every kind together with its default parameters.
    fn defaults() -> Result<Vec<Self>> {
        Self::Kind::iter()
            .map(|kind| Self::from_parts(kind, Self::default_params(kind)?))
            .collect()
    }
}
