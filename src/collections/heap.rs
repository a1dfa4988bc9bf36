use crate::collections::Queue;
use crate::cursors::{AbstractCursor, CursorError, Producer};
use std::cell::{Ref, RefCell, RefMut};
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::rc::Rc;
use tracing::{debug, instrument};

type Comparator<E> = Box<dyn Fn(&E, &E) -> Ordering>;

/// Backing storage shared by a [`Heap`] and its cursors.
///
/// Layout: `array[0]` is the root and has the single child `array[1]`; every
/// node `i >= 1` has the children `2i` and `2i + 1`. Hence the parent of any
/// `i >= 1` is `i / 2`, and the elements from index 1 on form a classical
/// 1-indexed binary heap whose minimum is never smaller than the root.
struct Arena<E> {
    array: Vec<E>,
    capacity: usize,
    comparator: Comparator<E>,
    version: u64,
    closed: bool,
}

impl<E> Arena<E> {
    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        (self.comparator)(&self.array[a], &self.array[b]) == Ordering::Less
    }

    #[inline]
    fn ensure_open(&self) -> Result<(), CursorError> {
        if self.closed {
            Err(CursorError::Closed)
        } else {
            Ok(())
        }
    }

    /// Moves the element at `i` towards the root while its parent is greater.
    fn bubble_up(&mut self, mut i: usize) {
        while i > 0 && self.less(i, i / 2) {
            self.array.swap(i, i / 2);
            i /= 2;
        }
    }

    /// Takes out the element above `child` by pulling the path of smaller
    /// children up one level each. The removed element ends in the leaf slot
    /// left free at the bottom of the path, whose index is returned.
    fn sink_in(&mut self, mut child: usize) -> usize {
        let len = self.array.len();
        let mut hole = child / 2;
        while child < len {
            if child > 1 && child + 1 < len && self.less(child + 1, child) {
                child += 1;
            }
            self.array.swap(hole, child);
            hole = child;
            child = 2 * hole;
        }
        hole
    }

    /// Restores heap order below `i`.
    fn sink_down(&mut self, mut i: usize) {
        let len = self.array.len();
        if i == 0 {
            if len > 1 && self.less(1, 0) {
                self.array.swap(0, 1);
                i = 1;
            } else {
                return;
            }
        }
        loop {
            let left = 2 * i;
            if left >= len {
                break;
            }
            let mut smaller = left;
            if left + 1 < len && self.less(left + 1, left) {
                smaller = left + 1;
            }
            if !self.less(smaller, i) {
                break;
            }
            self.array.swap(i, smaller);
            i = smaller;
        }
    }

    /// Re-establishes heap order after the element at `index` changed.
    fn repair(&mut self, index: usize) {
        if index > 0 && self.less(index, index / 2) {
            self.bubble_up(index);
        } else {
            self.sink_down(index);
        }
    }

    fn heapify(&mut self) {
        let len = self.array.len();
        if len > 2 {
            for i in (1..=(len - 1) / 2).rev() {
                self.sink_down(i);
            }
        }
        self.sink_down(0);
    }

    fn enqueue(&mut self, item: E) -> Result<(), CursorError> {
        self.ensure_open()?;
        if self.array.len() >= self.capacity {
            return Err(CursorError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.version += 1;
        let smaller_than_root = self
            .array
            .first()
            .is_some_and(|root| (self.comparator)(&item, root) == Ordering::Less);
        if smaller_than_root {
            let old_root = mem::replace(&mut self.array[0], item);
            self.array.push(old_root);
        } else {
            self.array.push(item);
        }
        let last = self.array.len() - 1;
        self.bubble_up(last);
        Ok(())
    }

    fn dequeue(&mut self) -> Result<E, CursorError> {
        self.ensure_open()?;
        let last = self.array.pop().ok_or(CursorError::NoSuchElement)?;
        self.version += 1;
        if self.array.is_empty() {
            return Ok(last);
        }
        let hole = self.sink_in(1);
        let root = mem::replace(&mut self.array[hole], last);
        self.bubble_up(hole);
        Ok(root)
    }

    fn replace(&mut self, item: E) -> Result<E, CursorError> {
        self.ensure_open()?;
        let root = self.array.first().ok_or(CursorError::NoSuchElement)?;
        if (self.comparator)(&item, root) == Ordering::Less {
            return Err(CursorError::IllegalArgument(
                "replacement must not be smaller than the current minimum".into(),
            ));
        }
        self.version += 1;
        let hole = self.sink_in(1);
        let root = mem::replace(&mut self.array[hole], item);
        self.bubble_up(hole);
        Ok(root)
    }

    fn update(&mut self, index: usize, item: E) -> Result<(), CursorError> {
        self.ensure_open()?;
        if index >= self.array.len() {
            return Err(CursorError::IllegalArgument(format!(
                "index {index} out of bounds for heap of size {}",
                self.array.len()
            )));
        }
        self.version += 1;
        self.array[index] = item;
        self.repair(index);
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> Result<E, CursorError> {
        self.ensure_open()?;
        if index >= self.array.len() {
            return Err(CursorError::NoSuchElement);
        }
        self.version += 1;
        let last = self.array.pop().ok_or(CursorError::NoSuchElement)?;
        if index == self.array.len() {
            return Ok(last);
        }
        let removed = mem::replace(&mut self.array[index], last);
        self.repair(index);
        Ok(removed)
    }
}

/// Fixed-capacity binary min-heap under a caller supplied order.
///
/// Besides the [`Queue`] operations it offers [`replace`](Heap::replace)
/// (extract the minimum and insert in one pass) and
/// [`update`](Heap::update) (change an element in place). The capacity is
/// set at construction and never grows.
///
/// [`cursor`](Heap::cursor) returns a view over the live array that can
/// remove and update elements. The heap and its cursors share the storage;
/// every structural change bumps a version counter, and a cursor whose
/// recorded version no longer matches fails with
/// [`CursorError::ConcurrentModification`] on its next step. Ties between
/// equal elements are delivered in no particular order.
pub struct Heap<E> {
    arena: Rc<RefCell<Arena<E>>>,
}

impl<E: Ord + 'static> Heap<E> {
    /// Heap under the natural order of `E`.
    pub fn new(capacity: usize) -> Self {
        Self::with_comparator(capacity, E::cmp)
    }
}

impl<E> Heap<E> {
    pub fn with_comparator<C>(capacity: usize, comparator: C) -> Self
    where
        C: Fn(&E, &E) -> Ordering + 'static,
    {
        Self::from_arena(Arena {
            array: Vec::with_capacity(capacity),
            capacity,
            comparator: Box::new(comparator),
            version: 0,
            closed: false,
        })
    }

    /// Builds a heap from the first `size` elements of `array` in O(size).
    ///
    /// The capacity is `array.len()`; slots past `size` are discarded.
    #[instrument(level = "debug", skip(array, comparator), fields(len = array.len()))]
    pub fn from_vec<C>(mut array: Vec<E>, size: usize, comparator: C) -> Result<Self, CursorError>
    where
        C: Fn(&E, &E) -> Ordering + 'static,
    {
        let capacity = array.len();
        if size > capacity {
            return Err(CursorError::IllegalArgument(format!(
                "size {size} exceeds the seed array length {capacity}"
            )));
        }
        array.truncate(size);
        let mut arena = Arena {
            array,
            capacity,
            comparator: Box::new(comparator),
            version: 0,
            closed: false,
        };
        arena.heapify();
        debug!(size, capacity, "heapified seed array");
        Ok(Self::from_arena(arena))
    }

    fn from_arena(arena: Arena<E>) -> Self {
        Self {
            arena: Rc::new(RefCell::new(arena)),
        }
    }

    #[inline]
    fn arena(&self) -> Ref<'_, Arena<E>> {
        self.arena.borrow()
    }

    #[inline]
    fn arena_mut(&mut self) -> RefMut<'_, Arena<E>> {
        self.arena.borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.arena().array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.arena().capacity
    }

    /// Structural modification counter.
    pub fn version(&self) -> u64 {
        self.arena().version
    }

    pub fn is_closed(&self) -> bool {
        self.arena().closed
    }

    pub fn enqueue(&mut self, item: E) -> Result<(), CursorError> {
        self.arena_mut().enqueue(item)
    }

    /// Removes and returns a minimum element.
    pub fn dequeue(&mut self) -> Result<E, CursorError> {
        self.arena_mut().dequeue()
    }

    /// Returns the minimum and inserts `item` in its place.
    ///
    /// `item` must not compare less than the current minimum; that keeps the
    /// operation to a single pass down the tree.
    pub fn replace(&mut self, item: E) -> Result<E, CursorError> {
        self.arena_mut().replace(item)
    }

    /// Overwrites the element stored at `index` (array order) and restores
    /// heap order around it.
    pub fn update(&mut self, index: usize, item: E) -> Result<(), CursorError> {
        self.arena_mut().update(index, item)
    }

    pub fn clear(&mut self) -> Result<(), CursorError> {
        let mut arena = self.arena_mut();
        arena.ensure_open()?;
        arena.version += 1;
        arena.array.clear();
        Ok(())
    }

    pub fn close(&mut self) {
        self.arena_mut().closed = true;
    }
}

impl<E: Clone> Heap<E> {
    /// A minimum element, left in place.
    pub fn peek(&self) -> Result<E, CursorError> {
        let arena = self.arena();
        arena.ensure_open()?;
        arena.array.first().cloned().ok_or(CursorError::NoSuchElement)
    }

    /// Elements in storage order.
    pub fn to_vec(&self) -> Vec<E> {
        self.arena().array.clone()
    }

    /// Cursor over the storage array, in array order, with `remove`,
    /// `update` and `reset` support.
    pub fn cursor(&self) -> HeapCursor<E> {
        HeapView {
            arena: Rc::clone(&self.arena),
            index: 0,
            version: self.version(),
        }
        .into_cursor()
    }
}

impl<E> fmt::Debug for Heap<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena();
        f.debug_struct("Heap")
            .field("len", &arena.array.len())
            .field("capacity", &arena.capacity)
            .field("version", &arena.version)
            .field("closed", &arena.closed)
            .finish()
    }
}

impl<E: Clone> Queue for Heap<E> {
    type Item = E;

    fn open(&mut self) -> Result<(), CursorError> {
        self.arena().ensure_open()
    }

    fn close(&mut self) {
        Heap::close(self)
    }

    fn len(&self) -> usize {
        Heap::len(self)
    }

    fn capacity(&self) -> Option<usize> {
        Some(Heap::capacity(self))
    }

    fn enqueue(&mut self, item: E) -> Result<(), CursorError> {
        Heap::enqueue(self, item)
    }

    fn dequeue(&mut self) -> Result<E, CursorError> {
        Heap::dequeue(self)
    }

    fn peek(&self) -> Result<E, CursorError> {
        Heap::peek(self)
    }

    fn clear(&mut self) -> Result<(), CursorError> {
        Heap::clear(self)
    }
}

pub type HeapCursor<E> = AbstractCursor<HeapView<E>>;

/// Index based view over the storage of a [`Heap`].
///
/// Removing replaces the element with the last one of the array and repairs
/// the order from there; the view then revisits that position. Repairs can
/// move elements across the traversal front, so a traversal that removes or
/// updates is not guaranteed to visit every remaining element exactly once.
pub struct HeapView<E> {
    arena: Rc<RefCell<Arena<E>>>,
    index: usize,
    version: u64,
}

impl<E> HeapView<E> {
    fn check(&self, arena: &Arena<E>) -> Result<(), CursorError> {
        arena.ensure_open()?;
        if arena.version != self.version {
            return Err(CursorError::ConcurrentModification {
                expected: self.version,
                found: arena.version,
            });
        }
        Ok(())
    }

    fn last_returned(&self) -> Result<usize, CursorError> {
        self.index
            .checked_sub(1)
            .ok_or(CursorError::IllegalState("no element has been returned yet"))
    }
}

impl<E: Clone> Producer for HeapView<E> {
    type Item = E;

    fn has_next_object(&mut self) -> Result<bool, CursorError> {
        let arena = self.arena.borrow();
        self.check(&arena)?;
        Ok(self.index < arena.array.len())
    }

    fn next_object(&mut self) -> Result<E, CursorError> {
        let item = {
            let arena = self.arena.borrow();
            self.check(&arena)?;
            arena
                .array
                .get(self.index)
                .cloned()
                .ok_or(CursorError::NoSuchElement)?
        };
        self.index += 1;
        Ok(item)
    }

    fn remove_object(&mut self) -> Result<(), CursorError> {
        let index = self.last_returned()?;
        let mut arena = self.arena.borrow_mut();
        self.check(&arena)?;
        arena.remove_at(index)?;
        self.version = arena.version;
        self.index = index;
        Ok(())
    }

    fn update_object(&mut self, item: E) -> Result<(), CursorError> {
        let index = self.last_returned()?;
        let mut arena = self.arena.borrow_mut();
        self.check(&arena)?;
        arena.update(index, item)?;
        self.version = arena.version;
        Ok(())
    }

    fn reset_object(&mut self) -> Result<(), CursorError> {
        let arena = self.arena.borrow();
        arena.ensure_open()?;
        self.index = 0;
        self.version = arena.version;
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
