use crate::cursors::CursorError;

/// FIFO-agnostic queue contract: the implementation decides which element
/// [`dequeue`](Queue::dequeue) hands out next.
///
/// Closing is terminal; every mutating call on a closed queue fails with
/// [`CursorError::Closed`].
pub trait Queue {
    type Item;

    fn open(&mut self) -> Result<(), CursorError>;

    fn close(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of elements, if bounded.
    fn capacity(&self) -> Option<usize> {
        None
    }

    fn enqueue(&mut self, item: Self::Item) -> Result<(), CursorError>;

    fn dequeue(&mut self) -> Result<Self::Item, CursorError>;

    /// Next element [`dequeue`](Queue::dequeue) would return.
    fn peek(&self) -> Result<Self::Item, CursorError>;

    fn clear(&mut self) -> Result<(), CursorError>;

    fn enqueue_all<I>(&mut self, items: I) -> Result<(), CursorError>
    where
        Self: Sized,
        I: IntoIterator<Item = Self::Item>,
    {
        for item in items {
            self.enqueue(item)?;
        }
        Ok(())
    }
}
