use crate::functions::AggregationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Running result of an aggregation.
///
/// `Uninitialized` is what a driver passes on the very first call, and what
/// it passes again to restart an aggregation from scratch. `WarmingUp` is
/// returned while a function has seen too little data to report anything;
/// it is handed back on the next call like any other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate<S> {
    Uninitialized,
    WarmingUp,
    Ready(S),
}

impl<S> Aggregate<S> {
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Aggregate::Ready(_))
    }

    #[inline]
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Aggregate::Uninitialized)
    }

    pub fn value(&self) -> Option<&S> {
        match self {
            Aggregate::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<S> {
        match self {
            Aggregate::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(S) -> U>(self, f: F) -> Aggregate<U> {
        match self {
            Aggregate::Uninitialized => Aggregate::Uninitialized,
            Aggregate::WarmingUp => Aggregate::WarmingUp,
            Aggregate::Ready(v) => Aggregate::Ready(f(v)),
        }
    }
}

impl<S> Default for Aggregate<S> {
    fn default() -> Self {
        Aggregate::Uninitialized
    }
}

/// One step of input. `Skip` means "no data this round" and leaves the
/// running state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<T> {
    Skip,
    Value(T),
}

impl<T> From<Option<T>> for Input<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Input::Value(v),
            None => Input::Skip,
        }
    }
}

impl<T> Input<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Input::Value(v) => Some(v),
            Input::Skip => None,
        }
    }
}

/// A fold step `(previous state, next input) -> new state`.
///
/// Implementations must
/// - return `state` unchanged for [`Input::Skip`];
/// - restart their warm-up when handed [`Aggregate::Uninitialized`];
/// - return [`Aggregate::WarmingUp`] until they can report a meaningful
///   value, and [`Aggregate::Ready`] on every step afterwards.
///
/// Functions may keep hidden running state in `self` (the `Stateful*`
/// estimators) or carry everything inside `State` (the stateless ones).
pub trait AggregationFunction<T> {
    type State;

    fn invoke(
        &mut self,
        state: Aggregate<Self::State>,
        next: Input<T>,
    ) -> Result<Aggregate<Self::State>, AggregationError>;

    /// Folds a whole sequence, starting from [`Aggregate::Uninitialized`].
    fn fold_all<I>(&mut self, values: I) -> Result<Aggregate<Self::State>, AggregationError>
    where
        Self: Sized,
        I: IntoIterator<Item = T>,
    {
        let mut state = Aggregate::Uninitialized;
        for v in values {
            state = self.invoke(state, Input::Value(v))?;
        }
        Ok(state)
    }
}

impl<T, F: AggregationFunction<T> + ?Sized> AggregationFunction<T> for Box<F> {
    type State = F::State;

    fn invoke(
        &mut self,
        state: Aggregate<Self::State>,
        next: Input<T>,
    ) -> Result<Aggregate<Self::State>, AggregationError> {
        (**self).invoke(state, next)
    }
}

/// Access to the hidden running state of an aggregation function, for
/// inspection and checkpointing.
///
/// [`restore`](OnlineAggregation::restore) may fail with
/// [`AggregationError::Unsupported`] when the state cannot be rebuilt.
pub trait OnlineAggregation {
    type Snapshot: Clone + Serialize + DeserializeOwned;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot) -> Result<(), AggregationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_accessors() {
        let ready: Aggregate<f64> = Aggregate::Ready(2.0);
        assert!(ready.is_ready());
        assert_eq!(ready.value(), Some(&2.0));
        assert_eq!(ready.map(|v| v * 2.0).into_value(), Some(4.0));

        let warming: Aggregate<f64> = Aggregate::WarmingUp;
        assert!(!warming.is_ready());
        assert_eq!(warming.map(|v| v + 1.0), Aggregate::WarmingUp);
        assert!(Aggregate::<u8>::default().is_uninitialized());
    }

    #[test]
    fn input_from_option() {
        assert_eq!(Input::from(Some(3)), Input::Value(3));
        assert_eq!(Input::<i32>::from(None), Input::Skip);
        assert_eq!(Input::Value('x').into_option(), Some('x'));
    }

    #[test]
    fn aggregate_serializes_as_tagged_value() {
        let json = serde_json::to_string(&Aggregate::Ready(1.5)).unwrap();
        assert_eq!(json, r#"{"Ready":1.5}"#);
        let back: Aggregate<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Aggregate::Ready(1.5));
    }
}
