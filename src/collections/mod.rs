mod heap;
mod queue;

pub use heap::{Heap, HeapCursor, HeapView};
pub use queue::Queue;
