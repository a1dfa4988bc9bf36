use crate::cursors::{AbstractCursor, CursorError, Producer};

pub type IteratorCursor<I> = AbstractCursor<IteratorSource<I>>;

/// Adapts any std [`Iterator`] to the cursor protocol.
///
/// Only peeking is supported; the iterator is pulled lazily, one element per
/// cursor cycle.
pub struct IteratorSource<I: Iterator> {
    iter: I,
    buffered: Option<I::Item>,
}

impl<I: Iterator> IteratorSource<I> {
    pub fn new<T: IntoIterator<IntoIter = I>>(iterable: T) -> Self {
        Self {
            iter: iterable.into_iter(),
            buffered: None,
        }
    }
}

impl<I: Iterator> Producer for IteratorSource<I> {
    type Item = I::Item;

    fn has_next_object(&mut self) -> Result<bool, CursorError> {
        self.buffered = self.iter.next();
        Ok(self.buffered.is_some())
    }

    fn next_object(&mut self) -> Result<I::Item, CursorError> {
        self.buffered.take().ok_or(CursorError::NoSuchElement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursors::{Cursor, CursorExt};
    use std::cell::Cell;

    #[test]
    fn pulls_lazily() {
        let pulled = Cell::new(0);
        let source = IteratorSource::new((0..100).inspect(|_| pulled.set(pulled.get() + 1)));
        let mut cursor = source.into_cursor();
        assert_eq!(pulled.get(), 0);
        assert_eq!(cursor.next().unwrap(), 0);
        assert_eq!(*cursor.peek().unwrap(), 1);
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn empty_iterator() {
        let mut cursor = IteratorSource::new(Vec::<u8>::new()).into_cursor();
        assert!(!cursor.has_next().unwrap());
        assert_eq!(cursor.next(), Err(CursorError::NoSuchElement));
    }

    #[test]
    fn drains_in_order() {
        let mut cursor = IteratorSource::new("a b c".split(' ')).into_cursor();
        assert_eq!(cursor.collect_vec().unwrap(), vec!["a", "b", "c"]);
    }
}
