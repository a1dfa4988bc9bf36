use crate::cursors::{Cursor, CursorError};
use tracing::trace;

/// Element source driven by an [`AbstractCursor`].
///
/// Only [`has_next_object`] and [`next_object`] are required. The cursor
/// calls `has_next_object` at most once per cycle and `next_object` only
/// after it returned `true`, so implementations need no guards of their
/// own. The optional hooks default to [`CursorError::Unsupported`] and the
/// matching `supports_*` flag to `false`; peeking is always available because
/// the cursor buffers the element itself.
///
/// [`has_next_object`]: Producer::has_next_object
/// [`next_object`]: Producer::next_object
pub trait Producer {
    type Item;

    fn has_next_object(&mut self) -> Result<bool, CursorError>;

    fn next_object(&mut self) -> Result<Self::Item, CursorError>;

    fn open_resources(&mut self) -> Result<(), CursorError> {
        Ok(())
    }

    fn close_resources(&mut self) {}

    /// Removes the element most recently produced by [`Producer::next_object`].
    fn remove_object(&mut self) -> Result<(), CursorError> {
        Err(CursorError::Unsupported("remove"))
    }

    /// Replaces the element most recently produced by [`Producer::next_object`].
    fn update_object(&mut self, _item: Self::Item) -> Result<(), CursorError> {
        Err(CursorError::Unsupported("update"))
    }

    fn reset_object(&mut self) -> Result<(), CursorError> {
        Err(CursorError::Unsupported("reset"))
    }

    fn supports_peek(&self) -> bool {
        true
    }

    fn supports_remove(&self) -> bool {
        false
    }

    fn supports_update(&self) -> bool {
        false
    }

    fn supports_reset(&self) -> bool {
        false
    }

    /// Wraps the producer in the cursor state machine.
    fn into_cursor(self) -> AbstractCursor<Self>
    where
        Self: Sized,
    {
        AbstractCursor::new(self)
    }
}

/// The cursor state machine on top of a [`Producer`].
///
/// Holds the memoized lookahead, the buffered next element and the validity
/// flag that gates `remove`/`update`. The buffered `Option` doubles as the
/// "already materialized" marker, so a `peek` followed by `next` asks the
/// producer for the element only once.
pub struct AbstractCursor<P: Producer> {
    producer: P,
    opened: bool,
    closed: bool,
    computed_has_next: bool,
    has_next: bool,
    next: Option<P::Item>,
    is_valid: bool,
}

impl<P: Producer> AbstractCursor<P> {
    pub fn new(producer: P) -> Self {
        Self {
            producer,
            opened: false,
            closed: false,
            computed_has_next: false,
            has_next: false,
            next: None,
            is_valid: false,
        }
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub fn into_inner(self) -> P {
        self.producer
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    fn clear_lookahead(&mut self) {
        self.computed_has_next = false;
        self.has_next = false;
        self.next = None;
        self.is_valid = false;
    }
}

impl<P: Producer> Cursor for AbstractCursor<P> {
    type Item = P::Item;

    fn open(&mut self) -> Result<(), CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        if !self.opened {
            self.producer.open_resources()?;
            self.opened = true;
            trace!("cursor opened");
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        if self.opened {
            self.producer.close_resources();
        }
        self.closed = true;
        self.clear_lookahead();
        trace!("cursor closed");
    }

    fn has_next(&mut self) -> Result<bool, CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        if !self.opened {
            self.open()?;
        }
        if !self.computed_has_next {
            self.has_next = self.producer.has_next_object()?;
            self.computed_has_next = true;
            self.is_valid = false;
        }
        Ok(self.has_next)
    }

    fn next(&mut self) -> Result<Self::Item, CursorError> {
        if !self.has_next()? {
            return Err(CursorError::NoSuchElement);
        }
        let item = match self.next.take() {
            Some(item) => item,
            None => self.producer.next_object()?,
        };
        self.computed_has_next = false;
        self.has_next = false;
        self.is_valid = true;
        Ok(item)
    }

    fn peek(&mut self) -> Result<&Self::Item, CursorError> {
        if !self.supports_peek() {
            return Err(CursorError::Unsupported("peek"));
        }
        if !self.has_next()? {
            return Err(CursorError::NoSuchElement);
        }
        let item = match self.next.take() {
            Some(item) => item,
            None => self.producer.next_object()?,
        };
        Ok(self.next.insert(item))
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        if !self.supports_remove() {
            return Err(CursorError::Unsupported("remove"));
        }
        if !self.is_valid {
            return Err(CursorError::IllegalState(
                "remove must directly follow a call to next",
            ));
        }
        self.producer.remove_object()?;
        self.is_valid = false;
        Ok(())
    }

    fn update(&mut self, item: Self::Item) -> Result<(), CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        if !self.supports_update() {
            return Err(CursorError::Unsupported("update"));
        }
        if !self.is_valid {
            return Err(CursorError::IllegalState(
                "update must directly follow a call to next",
            ));
        }
        self.producer.update_object(item)?;
        self.is_valid = false;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), CursorError> {
        if self.closed {
            return Err(CursorError::Closed);
        }
        if !self.supports_reset() {
            return Err(CursorError::Unsupported("reset"));
        }
        self.producer.reset_object()?;
        self.clear_lookahead();
        trace!("cursor reset");
        Ok(())
    }

    fn supports_peek(&self) -> bool {
        self.producer.supports_peek()
    }

    fn supports_remove(&self) -> bool {
        self.producer.supports_remove()
    }

    fn supports_update(&self) -> bool {
        self.producer.supports_update()
    }

    fn supports_reset(&self) -> bool {
        self.producer.supports_reset()
    }
}
