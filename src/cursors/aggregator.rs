use crate::cursors::{AbstractCursor, Cursor, CursorError, Producer};
use crate::functions::{Aggregate, AggregationError, AggregationFunction, Input};

pub type AggregatorCursor<C, F> = AbstractCursor<Aggregator<C, F>>;

/// Runs an [`AggregationFunction`] over an input cursor.
///
/// As a [`Producer`] it yields the running result after every input element
/// once the function is ready; warm-up steps are consumed without producing
/// anything. [`Aggregator::last`] skips the intermediate results and returns
/// the final one.
///
/// A failed step is terminal: the state before the failure is kept and every
/// later step reports the same error until the aggregator is reset.
pub struct Aggregator<C, F>
where
    C: Cursor,
    F: AggregationFunction<C::Item>,
{
    input: C,
    function: F,
    state: Aggregate<F::State>,
    pending: Option<F::State>,
    failure: Option<AggregationError>,
}

impl<C, F> Aggregator<C, F>
where
    C: Cursor,
    F: AggregationFunction<C::Item>,
    F::State: Clone,
{
    pub fn new(input: C, function: F) -> Self {
        Self {
            input,
            function,
            state: Aggregate::Uninitialized,
            pending: None,
            failure: None,
        }
    }

    /// Current aggregate, without consuming further input.
    pub fn state(&self) -> &Aggregate<F::State> {
        &self.state
    }

    pub fn function(&self) -> &F {
        &self.function
    }

    /// Feeds the rest of the input and returns the final aggregate.
    ///
    /// An empty input gives [`Aggregate::Uninitialized`]; an input too short
    /// for the function gives [`Aggregate::WarmingUp`].
    pub fn last(&mut self) -> Result<Aggregate<F::State>, CursorError> {
        if let Some(e) = &self.failure {
            return Err(e.clone().into());
        }
        while self.input.has_next()? {
            self.step()?;
        }
        self.pending = None;
        Ok(self.state.clone())
    }

    fn step(&mut self) -> Result<(), CursorError> {
        if let Some(e) = &self.failure {
            return Err(e.clone().into());
        }
        let value = self.input.next()?;
        match self.function.invoke(self.state.clone(), Input::Value(value)) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(e) => {
                self.failure = Some(e.clone());
                Err(e.into())
            }
        }
    }
}

impl<C, F> Producer for Aggregator<C, F>
where
    C: Cursor,
    F: AggregationFunction<C::Item>,
    F::State: Clone,
{
    type Item = F::State;

    fn has_next_object(&mut self) -> Result<bool, CursorError> {
        if let Some(e) = &self.failure {
            return Err(e.clone().into());
        }
        while self.pending.is_none() && self.input.has_next()? {
            self.step()?;
            if let Aggregate::Ready(s) = &self.state {
                self.pending = Some(s.clone());
            }
        }
        Ok(self.pending.is_some())
    }

    fn next_object(&mut self) -> Result<F::State, CursorError> {
        self.pending.take().ok_or(CursorError::NoSuchElement)
    }

    fn open_resources(&mut self) -> Result<(), CursorError> {
        self.input.open()
    }

    fn close_resources(&mut self) {
        self.input.close();
    }

    /// Rewinds the input and restarts the function from
    /// [`Aggregate::Uninitialized`].
    fn reset_object(&mut self) -> Result<(), CursorError> {
        self.input.reset()?;
        self.state = Aggregate::Uninitialized;
        self.pending = None;
        self.failure = None;
        Ok(())
    }

    fn supports_reset(&self) -> bool {
        self.input.supports_reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursors::{CursorExt, IteratorCursor, IteratorSource, VecCursor};
    use crate::functions::{
        Count, OverflowPolicy, StatefulVarianceEstimator, SumEstimator,
        ThirdCentralMomentEstimator,
    };
    use approx::assert_relative_eq;

    const DATA: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn yields_running_variance() {
        let input = VecCursor::from(DATA.to_vec());
        let mut cursor = Aggregator::new(input, StatefulVarianceEstimator::new()).into_cursor();
        let out = cursor.collect_vec().unwrap();
        assert_eq!(out.len(), DATA.len());
        assert_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 2.0);
        assert_relative_eq!(*out.last().unwrap(), 32.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn warm_up_steps_are_not_produced() {
        let input = VecCursor::from(DATA.to_vec());
        let mut cursor = Aggregator::new(input, ThirdCentralMomentEstimator::new()).into_cursor();
        assert_eq!(cursor.count_remaining().unwrap(), DATA.len() - 2);
    }

    #[test]
    fn last_returns_the_final_state() {
        let input = VecCursor::from(DATA.to_vec());
        let mut aggregator = Aggregator::new(input, StatefulVarianceEstimator::new());
        let last = aggregator.last().unwrap();
        assert_relative_eq!(last.into_value().unwrap(), 32.0 / 7.0, epsilon = 1e-12);
        assert_eq!(aggregator.function().count(), 8);
    }

    #[test]
    fn short_inputs_report_their_phase() {
        let empty = VecCursor::<f64>::from(vec![]);
        assert_eq!(
            Aggregator::new(empty, StatefulVarianceEstimator::new()).last().unwrap(),
            Aggregate::Uninitialized
        );

        let short = VecCursor::from(vec![1.0, 2.0]);
        assert_eq!(
            Aggregator::new(short, ThirdCentralMomentEstimator::new()).last().unwrap(),
            Aggregate::WarmingUp
        );
    }

    #[test]
    fn reset_restarts_the_aggregation() {
        let input = VecCursor::from(vec!['a', 'b', 'c']);
        let mut cursor = Aggregator::new(input, Count::new()).into_cursor();
        assert!(cursor.supports_reset());
        assert_eq!(cursor.collect_vec().unwrap(), vec![1, 2, 3]);
        cursor.reset().unwrap();
        assert_eq!(cursor.next().unwrap(), 1);
        assert_eq!(cursor.producer().state(), &Aggregate::Ready(1));
    }

    #[test]
    fn reset_follows_the_input_capability() {
        let input = IteratorCursor::new(IteratorSource::new(0u32..3));
        let mut cursor = Aggregator::new(input, Count::new()).into_cursor();
        assert!(!cursor.supports_reset());
        assert_eq!(cursor.reset(), Err(CursorError::Unsupported("reset")));
    }

    #[test]
    fn aggregation_errors_surface_as_cursor_errors() {
        let input = VecCursor::from(vec![1.0, 2.0, 3.0]);
        let estimator = SumEstimator::new(2, OverflowPolicy::Restrictive).unwrap();
        let mut cursor = Aggregator::new(input, estimator).into_cursor();
        assert!(cursor.next().is_ok());
        assert!(cursor.next().is_ok());
        assert!(matches!(
            cursor.next(),
            Err(CursorError::Aggregation(AggregationError::EntiretyExceeded { .. }))
        ));
    }

    #[test]
    fn failed_step_keeps_failing_until_reset() {
        let input = VecCursor::from(vec![1.0, 2.0, 3.0, 4.0]);
        let estimator = SumEstimator::new(2, OverflowPolicy::Restrictive).unwrap();
        let mut cursor = Aggregator::new(input, estimator).into_cursor();
        assert_relative_eq!(cursor.next().unwrap(), 2.0);
        assert_relative_eq!(cursor.next().unwrap(), 3.0);

        let exceeded: Result<f64, CursorError> = Err(CursorError::Aggregation(
            AggregationError::EntiretyExceeded { observed: 3, declared: 2 },
        ));
        assert_eq!(cursor.next(), exceeded);
        assert_eq!(cursor.next(), exceeded);
        assert!(matches!(cursor.has_next(), Err(CursorError::Aggregation(_))));
        assert_eq!(cursor.producer().state(), &Aggregate::Ready(3.0));

        cursor.reset().unwrap();
        assert_relative_eq!(cursor.next().unwrap(), 2.0);
    }

    #[test]
    fn last_reports_a_failed_aggregation() {
        let input = VecCursor::from(vec![1.0, 2.0, 3.0, 4.0]);
        let estimator = SumEstimator::new(2, OverflowPolicy::Restrictive).unwrap();
        let mut aggregator = Aggregator::new(input, estimator);
        assert!(matches!(aggregator.last(), Err(CursorError::Aggregation(_))));
        assert!(matches!(aggregator.last(), Err(CursorError::Aggregation(_))));
        assert_eq!(aggregator.state(), &Aggregate::Ready(3.0));
    }

    #[test]
    fn closing_closes_the_input() {
        let input = VecCursor::from(vec![1.0]);
        let mut cursor = Aggregator::new(input, StatefulVarianceEstimator::new()).into_cursor();
        cursor.has_next().unwrap();
        cursor.close();
        assert!(cursor.into_inner().input.is_closed());
    }
}
