use crate::functions::reservoir::{ReservoirStrategy, ReservoirStrategyKind};
use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input, OnlineAggregation};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::mem;

/// Uniform sample of fixed size over a stream of unknown length.
///
/// The first `size` values fill the reservoir directly and the function
/// reports [`Aggregate::WarmingUp`] until it is full. From then on the state
/// is `Ready(reservoir)`: after every step it holds a uniform sample of all
/// values seen so far. Which values get in, and where, is left to the
/// [`ReservoirStrategy`].
///
/// The generator is re-seeded whenever the aggregation restarts, so a given
/// seed always produces the same sample for the same stream.
#[derive(Debug)]
pub struct ReservoirSample<T> {
    size: usize,
    seed: u64,
    rng: StdRng,
    strategy: Box<dyn ReservoirStrategy>,
    filling: Vec<T>,
    processed: u64,
    remaining_skip: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservoirSnapshot {
    pub size: usize,
    pub processed: u64,
    pub remaining_skip: Option<u64>,
}

impl<T> ReservoirSample<T> {
    pub fn new(
        size: usize,
        strategy: Box<dyn ReservoirStrategy>,
        seed: u64,
    ) -> Result<Self, AggregationError> {
        if size == 0 {
            return Err(AggregationError::InvalidArgument(
                "reservoir must hold at least one element".into(),
            ));
        }
        Ok(Self {
            size,
            seed,
            rng: StdRng::seed_from_u64(seed),
            strategy,
            filling: Vec::with_capacity(size),
            processed: 0,
            remaining_skip: None,
        })
    }

    pub fn with_kind(
        size: usize,
        kind: ReservoirStrategyKind,
        seed: u64,
    ) -> Result<Self, AggregationError> {
        Self::new(size, kind.build(), seed)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of values offered since the last restart.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.strategy.reset();
        self.filling.clear();
        self.processed = 0;
        self.remaining_skip = None;
    }

    fn fill(&mut self, x: T) -> Aggregate<Vec<T>> {
        self.processed += 1;
        self.filling.push(x);
        if self.filling.len() < self.size {
            Aggregate::WarmingUp
        } else {
            Aggregate::Ready(mem::replace(&mut self.filling, Vec::with_capacity(self.size)))
        }
    }

    fn sample(&mut self, reservoir: &mut [T], x: T) {
        let skip = match self.remaining_skip {
            Some(skip) => skip,
            None => self.strategy.skip(&mut self.rng, self.processed, self.size),
        };
        self.processed += 1;
        if skip > 0 {
            self.remaining_skip = Some(skip - 1);
            return;
        }
        let slot = self.strategy.slot(&mut self.rng, self.size);
        reservoir[slot] = x;
        self.remaining_skip = None;
    }
}

impl<T> AggregationFunction<T> for ReservoirSample<T> {
    type State = Vec<T>;

    fn invoke(
        &mut self,
        state: Aggregate<Vec<T>>,
        next: Input<T>,
    ) -> Result<Aggregate<Vec<T>>, AggregationError> {
        let Input::Value(x) = next else {
            return Ok(state);
        };
        match state {
            Aggregate::Uninitialized => {
                self.restart();
                Ok(self.fill(x))
            }
            Aggregate::WarmingUp => Ok(self.fill(x)),
            Aggregate::Ready(mut reservoir) => {
                if reservoir.len() != self.size {
                    return Err(AggregationError::InvalidArgument(format!(
                        "reservoir holds {} elements, expected {}",
                        reservoir.len(),
                        self.size
                    )));
                }
                self.sample(&mut reservoir, x);
                Ok(Aggregate::Ready(reservoir))
            }
        }
    }
}

impl<T> OnlineAggregation for ReservoirSample<T> {
    type Snapshot = ReservoirSnapshot;

    fn snapshot(&self) -> ReservoirSnapshot {
        ReservoirSnapshot {
            size: self.size,
            processed: self.processed,
            remaining_skip: self.remaining_skip,
        }
    }

    fn restore(&mut self, _snapshot: ReservoirSnapshot) -> Result<(), AggregationError> {
        Err(AggregationError::Unsupported(
            "the random generator of a reservoir sample cannot be restored",
        ))
    }
}
