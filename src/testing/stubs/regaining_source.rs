use crate::cursors::{CursorError, Producer};
use std::collections::VecDeque;

/// Producer that reports `false` once when it runs dry and `true` on every
/// later query, like a source that receives data after the fact.
pub struct RegainingSource<T> {
    items: VecDeque<T>,
    reported_end: bool,
}

impl<T> RegainingSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
            reported_end: false,
        }
    }

    /// Whether a further `has_next_object` call would answer `true`.
    pub fn would_regain(&self) -> bool {
        self.reported_end
    }
}

impl<T> Producer for RegainingSource<T> {
    type Item = T;

    fn has_next_object(&mut self) -> Result<bool, CursorError> {
        if !self.items.is_empty() || self.reported_end {
            return Ok(true);
        }
        self.reported_end = true;
        Ok(false)
    }

    fn next_object(&mut self) -> Result<T, CursorError> {
        self.items
            .pop_front()
            .ok_or(CursorError::IllegalState("source regained after exhaustion"))
    }
}
