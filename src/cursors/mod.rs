//! The cursor protocol and its building blocks.

mod abstract_cursor;
mod aggregator;
mod cursor;
mod error;
mod sources;

pub use abstract_cursor::{AbstractCursor, Producer};
pub use aggregator::{Aggregator, AggregatorCursor};
pub use cursor::{Cursor, CursorExt, Iter};
pub use error::CursorError;
pub use sources::{
    IteratorCursor, IteratorSource, QueueCursor, QueueSource, VecCursor, VecSource,
};
