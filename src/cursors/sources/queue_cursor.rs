use crate::collections::Queue;
use crate::cursors::{AbstractCursor, CursorError, Producer};

pub type QueueCursor<Q> = AbstractCursor<QueueSource<Q>>;

/// Drains a [`Queue`] in dequeue order.
///
/// Opening and closing the cursor opens and closes the queue.
#[derive(Debug)]
pub struct QueueSource<Q: Queue> {
    queue: Q,
}

impl<Q: Queue> QueueSource<Q> {
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }
}

impl<Q: Queue> Producer for QueueSource<Q> {
    type Item = Q::Item;

    fn has_next_object(&mut self) -> Result<bool, CursorError> {
        Ok(!self.queue.is_empty())
    }

    fn next_object(&mut self) -> Result<Q::Item, CursorError> {
        self.queue.dequeue()
    }

    fn open_resources(&mut self) -> Result<(), CursorError> {
        self.queue.open()
    }

    fn close_resources(&mut self) {
        self.queue.close()
    }
}
