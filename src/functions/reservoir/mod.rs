mod reservoir_sample;
mod strategy;

pub use reservoir_sample::{ReservoirSample, ReservoirSnapshot};
pub use strategy::{RType, ReservoirStrategy, ReservoirStrategyKind, XType, ZType};
