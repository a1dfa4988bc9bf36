use rand::Rng;
use rand::rngs::StdRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::trace;

/// Decides which stream elements enter a full reservoir.
///
/// After the reservoir of size `n` is full, the sampler asks [`skip`] how
/// many upcoming elements to pass over, then asks [`slot`] where to store
/// the first element that is not skipped. `processed` is the number of
/// elements offered so far.
///
/// [`skip`]: ReservoirStrategy::skip
/// [`slot`]: ReservoirStrategy::slot
pub trait ReservoirStrategy: Debug {
    fn skip(&mut self, rng: &mut StdRng, processed: u64, reservoir_size: usize) -> u64;

    fn slot(&mut self, rng: &mut StdRng, reservoir_size: usize) -> usize;

    /// Drops any state carried between draws.
    fn reset(&mut self) {}
}

/// Draw in `(0, 1]`, safe to take the logarithm of.
#[inline]
fn open_unit(rng: &mut StdRng) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Algorithm R: one random index per element.
#[derive(Debug, Default, Clone)]
pub struct RType {
    pending_slot: usize,
}

impl ReservoirStrategy for RType {
    fn skip(&mut self, rng: &mut StdRng, processed: u64, reservoir_size: usize) -> u64 {
        let n = reservoir_size as u64;
        let mut t = processed;
        let mut skipped = 0;
        loop {
            t += 1;
            let j = rng.random_range(0..t);
            if j < n {
                self.pending_slot = j as usize;
                return skipped;
            }
            skipped += 1;
        }
    }

    fn slot(&mut self, _rng: &mut StdRng, _reservoir_size: usize) -> usize {
        self.pending_slot
    }
}

/// Algorithm X: one uniform draw per skip, searched sequentially.
#[derive(Debug, Default, Clone)]
pub struct XType;

impl XType {
    fn draw(rng: &mut StdRng, processed: u64, reservoir_size: usize) -> u64 {
        Self::search(open_unit(rng), processed, reservoir_size)
    }

    /// Smallest skip whose survival probability drops to `v`; `v` must be positive.
    fn search(v: f64, processed: u64, reservoir_size: usize) -> u64 {
        let n = reservoir_size as f64;
        let mut t = processed as f64 + 1.0;
        let mut quot = (t - n) / t;
        let mut skipped = 0;
        while quot > v {
            skipped += 1;
            t += 1.0;
            quot *= (t - n) / t;
        }
        skipped
    }
}

impl ReservoirStrategy for XType {
    fn skip(&mut self, rng: &mut StdRng, processed: u64, reservoir_size: usize) -> u64 {
        Self::draw(rng, processed, reservoir_size)
    }

    fn slot(&mut self, rng: &mut StdRng, reservoir_size: usize) -> usize {
        rng.random_range(0..reservoir_size)
    }
}

/// Algorithm Z: rejection sampling of the skip distance.
///
/// Below `THRESHOLD * n` processed elements the sequential search of
/// [`XType`] is cheaper and is used instead.
#[derive(Debug, Default, Clone)]
pub struct ZType {
    w: Option<f64>,
}

impl ZType {
    pub const THRESHOLD: u64 = 22;

    fn fresh_w(rng: &mut StdRng, n: f64) -> f64 {
        (-open_unit(rng).ln() / n).exp()
    }
}

impl ReservoirStrategy for ZType {
    fn skip(&mut self, rng: &mut StdRng, processed: u64, reservoir_size: usize) -> u64 {
        if processed <= Self::THRESHOLD * reservoir_size as u64 {
            return XType::draw(rng, processed, reservoir_size);
        }
        let n = reservoir_size as f64;
        let t = processed as f64;
        let term = t - n + 1.0;
        let mut w = match self.w {
            Some(w) => w,
            None => {
                trace!(processed, "switching to rejection sampling");
                Self::fresh_w(rng, n)
            }
        };
        loop {
            let u = open_unit(rng);
            let x = t * (w - 1.0);
            let s = x.floor();

            // Cheap acceptance test against the squeeze h(s) / c g(x).
            let lhs = ((u * ((t + 1.0) / term).powi(2) * (term + s) / (t + x)).ln() / n).exp();
            let rhs = (t + x) / (term + s) * term / t;
            if lhs <= rhs {
                self.w = Some(rhs / lhs);
                return s as u64;
            }

            // Full test against f(s) / c g(x).
            let mut y = u * (t + 1.0) / term * (t + s + 1.0) / (t + x);
            let (mut denom, numer_lim) = if n < s {
                (t, term + s)
            } else {
                (t - n + s, t + 1.0)
            };
            let mut numer = t + s;
            while numer >= numer_lim {
                y = y * numer / denom;
                denom -= 1.0;
                numer -= 1.0;
            }
            w = Self::fresh_w(rng, n);
            if (y.ln() / n).exp() <= (t + x) / t {
                self.w = Some(w);
                return s as u64;
            }
        }
    }

    fn slot(&mut self, rng: &mut StdRng, reservoir_size: usize) -> usize {
        rng.random_range(0..reservoir_size)
    }

    fn reset(&mut self) {
        self.w = None;
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReservoirStrategyKind {
    R,
    X,
    #[default]
    Z,
}

impl ReservoirStrategyKind {
    pub fn build(self) -> Box<dyn ReservoirStrategy> {
        match self {
            ReservoirStrategyKind::R => Box::new(RType::default()),
            ReservoirStrategyKind::X => Box::new(XType),
            ReservoirStrategyKind::Z => Box::new(ZType::default()),
        }
    }
}
