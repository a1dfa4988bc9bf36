use crate::cursors::{AbstractCursor, CursorError, Producer};

/// Cursor over an owned vector. Supports every optional operation.
pub type VecCursor<T> = AbstractCursor<VecSource<T>>;

/// Producer over an owned vector.
///
/// `remove` and `update` act on the vector itself, so the changes survive a
/// `reset` and are visible through [`VecSource::into_items`].
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    items: Vec<T>,
    position: usize,
}

impl<T: Clone> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, position: 0 }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone> From<Vec<T>> for VecCursor<T> {
    fn from(items: Vec<T>) -> Self {
        VecSource::new(items).into_cursor()
    }
}

impl<T: Clone> Producer for VecSource<T> {
    type Item = T;

    fn has_next_object(&mut self) -> Result<bool, CursorError> {
        Ok(self.position < self.items.len())
    }

    fn next_object(&mut self) -> Result<T, CursorError> {
        let item = self
            .items
            .get(self.position)
            .cloned()
            .ok_or(CursorError::NoSuchElement)?;
        self.position += 1;
        Ok(item)
    }

    fn remove_object(&mut self) -> Result<(), CursorError> {
        let last = self
            .position
            .checked_sub(1)
            .ok_or(CursorError::IllegalState("nothing to remove"))?;
        self.items.remove(last);
        self.position = last;
        Ok(())
    }

    fn update_object(&mut self, item: T) -> Result<(), CursorError> {
        let last = self
            .position
            .checked_sub(1)
            .ok_or(CursorError::IllegalState("nothing to update"))?;
        self.items[last] = item;
        Ok(())
    }

    fn reset_object(&mut self) -> Result<(), CursorError> {
        self.position = 0;
        Ok(())
    }

    fn supports_remove(&self) -> bool {
        true
    }

    fn supports_update(&self) -> bool {
        true
    }

    fn supports_reset(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursors::{Cursor, CursorExt};

    #[test]
    fn remove_requires_a_preceding_next() {
        let mut cursor = VecCursor::from(vec![1, 2, 3]);
        assert!(matches!(cursor.remove(), Err(CursorError::IllegalState(_))));

        assert_eq!(cursor.next().unwrap(), 1);
        cursor.remove().unwrap();
        assert!(matches!(cursor.remove(), Err(CursorError::IllegalState(_))));

        assert_eq!(cursor.next().unwrap(), 2);
        assert!(cursor.has_next().unwrap());
        assert!(matches!(cursor.remove(), Err(CursorError::IllegalState(_))));

        assert_eq!(cursor.next().unwrap(), 3);
        assert_eq!(cursor.into_inner().into_items(), vec![2, 3]);
    }

    #[test]
    fn update_after_peek_is_rejected() {
        let mut cursor = VecCursor::from(vec![10, 20]);
        assert_eq!(cursor.next().unwrap(), 10);
        assert_eq!(*cursor.peek().unwrap(), 20);
        assert!(matches!(
            cursor.update(11),
            Err(CursorError::IllegalState(_))
        ));
    }

    #[test]
    fn update_once_per_cycle() {
        let mut cursor = VecCursor::from(vec![1, 2, 3]);
        while cursor.has_next().unwrap() {
            let v = cursor.next().unwrap();
            cursor.update(v * 10).unwrap();
            assert!(cursor.update(v).is_err());
        }
        assert_eq!(cursor.into_inner().into_items(), vec![10, 20, 30]);
    }

    #[test]
    fn removing_every_other_element() {
        let mut cursor = VecCursor::from((1..=6).collect::<Vec<_>>());
        while cursor.has_next().unwrap() {
            if cursor.next().unwrap() % 2 == 0 {
                cursor.remove().unwrap();
            }
        }
        assert_eq!(cursor.producer().items(), &[1, 3, 5]);
    }

    #[test]
    fn reset_replays_without_undoing_removals() {
        let mut cursor = VecCursor::from(vec!['a', 'b', 'c']);
        assert_eq!(cursor.next().unwrap(), 'a');
        cursor.remove().unwrap();
        assert_eq!(cursor.collect_vec().unwrap(), vec!['b', 'c']);
        assert!(!cursor.has_next().unwrap());

        cursor.reset().unwrap();
        assert_eq!(cursor.collect_vec().unwrap(), vec!['b', 'c']);
    }

    #[test]
    fn reset_clears_pending_validity() {
        let mut cursor = VecCursor::from(vec![1, 2]);
        cursor.next().unwrap();
        cursor.reset().unwrap();
        assert!(cursor.remove().is_err());
        assert_eq!(cursor.next().unwrap(), 1);
    }
}
