use crate::cursors::CursorError;

/// Lazy, resumable iteration protocol.
///
/// A cursor moves through `not opened -> opened -> closed`. [`has_next`]
/// opens it implicitly; [`close`] is terminal. Lookahead is memoized, so
/// `has_next` can be called any number of times between two [`next`] calls
/// without touching the source. Once `has_next` reports `false` it keeps
/// reporting `false` until the cursor is [`reset`].
///
/// `peek`, `remove`, `update` and `reset` are optional. Callers can ask
/// through the `supports_*` predicates, which never change for a given
/// instance, and an unsupported call fails with
/// [`CursorError::Unsupported`] instead of being silently ignored.
///
/// [`has_next`]: Cursor::has_next
/// [`next`]: Cursor::next
/// [`close`]: Cursor::close
/// [`reset`]: Cursor::reset
pub trait Cursor {
    type Item;

    /// Acquires the resources of the cursor. Calling it again is a no-op;
    /// calling it on a closed cursor fails with [`CursorError::Closed`].
    fn open(&mut self) -> Result<(), CursorError>;

    /// Releases the resources of the cursor. Idempotent.
    fn close(&mut self);

    /// Reports whether a further element is available.
    fn has_next(&mut self) -> Result<bool, CursorError>;

    /// Returns the next element and advances.
    fn next(&mut self) -> Result<Self::Item, CursorError>;

    /// Shows the next element without consuming it.
    fn peek(&mut self) -> Result<&Self::Item, CursorError>;

    /// Removes the element returned by the last call to [`Cursor::next`]
    /// from the underlying structure.
    fn remove(&mut self) -> Result<(), CursorError>;

    /// Replaces the element returned by the last call to [`Cursor::next`]
    /// in the underlying structure.
    fn update(&mut self, item: Self::Item) -> Result<(), CursorError>;

    /// Rewinds the cursor so the same sequence can be traversed again.
    fn reset(&mut self) -> Result<(), CursorError>;

    fn supports_peek(&self) -> bool;

    fn supports_remove(&self) -> bool;

    fn supports_update(&self) -> bool;

    fn supports_reset(&self) -> bool;
}

/// Convenience methods available on every [`Cursor`].
pub trait CursorExt: Cursor {
    /// Borrows the cursor as a std [`Iterator`] of `Result`s.
    ///
    /// The iterator stops after the first error.
    fn iter(&mut self) -> Iter<'_, Self>
    where
        Self: Sized,
    {
        Iter {
            cursor: self,
            failed: false,
        }
    }

    /// Drains the remaining elements into a vector.
    fn collect_vec(&mut self) -> Result<Vec<Self::Item>, CursorError> {
        let mut out = Vec::new();
        while self.has_next()? {
            out.push(self.next()?);
        }
        Ok(out)
    }

    /// Consumes the remaining elements and returns how many there were.
    fn count_remaining(&mut self) -> Result<usize, CursorError> {
        let mut n = 0;
        while self.has_next()? {
            self.next()?;
            n += 1;
        }
        Ok(n)
    }
}

impl<C: Cursor + ?Sized> CursorExt for C {}

pub struct Iter<'a, C: Cursor> {
    cursor: &'a mut C,
    failed: bool,
}

impl<C: Cursor> Iterator for Iter<'_, C> {
    type Item = Result<C::Item, CursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let step = match self.cursor.has_next() {
            Ok(true) => self.cursor.next(),
            Ok(false) => return None,
            Err(e) => Err(e),
        };
        if step.is_err() {
            self.failed = true;
        }
        Some(step)
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    fn open(&mut self) -> Result<(), CursorError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn has_next(&mut self) -> Result<bool, CursorError> {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Self::Item, CursorError> {
        (**self).next()
    }

    fn peek(&mut self) -> Result<&Self::Item, CursorError> {
        (**self).peek()
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        (**self).remove()
    }

    fn update(&mut self, item: Self::Item) -> Result<(), CursorError> {
        (**self).update(item)
    }

    fn reset(&mut self) -> Result<(), CursorError> {
        (**self).reset()
    }

    fn supports_peek(&self) -> bool {
        (**self).supports_peek()
    }

    fn supports_remove(&self) -> bool {
        (**self).supports_remove()
    }

    fn supports_update(&self) -> bool {
        (**self).supports_update()
    }

    fn supports_reset(&self) -> bool {
        (**self).supports_reset()
    }
}
