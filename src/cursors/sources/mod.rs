mod iterator_cursor;
mod queue_cursor;
mod vec_cursor;

pub use iterator_cursor::{IteratorCursor, IteratorSource};
pub use queue_cursor::{QueueCursor, QueueSource};
pub use vec_cursor::{VecCursor, VecSource};
