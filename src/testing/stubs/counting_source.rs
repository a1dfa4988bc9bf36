use crate::cursors::{CursorError, Producer};
use std::collections::VecDeque;

/// Producer that records how often each hook was called.
pub struct CountingSource<T> {
    items: VecDeque<T>,
    has_next_calls: usize,
    next_calls: usize,
    open_calls: usize,
    close_calls: usize,
}

impl<T> CountingSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
            has_next_calls: 0,
            next_calls: 0,
            open_calls: 0,
            close_calls: 0,
        }
    }

    pub fn has_next_calls(&self) -> usize {
        self.has_next_calls
    }

    pub fn next_calls(&self) -> usize {
        self.next_calls
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }
}

impl<T> Producer for CountingSource<T> {
    type Item = T;

    fn has_next_object(&mut self) -> Result<bool, CursorError> {
        self.has_next_calls += 1;
        Ok(!self.items.is_empty())
    }

    fn next_object(&mut self) -> Result<T, CursorError> {
        self.next_calls += 1;
        self.items.pop_front().ok_or(CursorError::NoSuchElement)
    }

    fn open_resources(&mut self) -> Result<(), CursorError> {
        self.open_calls += 1;
        Ok(())
    }

    fn close_resources(&mut self) {
        self.close_calls += 1;
    }
}
