use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::{Error, PoolRegistry, PooledArray, Result};

/// A list of values stored in a [`PooledArray`].
///
/// Appending grows the backing array only once it is full, along the same capacity steps as
/// [`PooledArray::reallocate()`]. Removing shifts the tail left and leaves a default value in the
/// vacated slot, so no removed value lingers in the backing array.
///
/// # Example
///
/// ```rust
/// use reuse_pool::{PooledList, PoolRegistry};
///
/// let registry = PoolRegistry::new();
///
/// let mut rooms = PooledList::new(&registry);
/// rooms.push("hall");
/// rooms.push("kitchen");
/// rooms.push("study");
///
/// assert!(rooms.remove(&"kitchen"));
/// assert_eq!(&rooms[..], &["hall", "study"]);
/// ```
pub struct PooledList<T: Default + Send + 'static> {
    items: PooledArray<T>,
}

impl<T: Default + Send + 'static> PooledList<T> {
    /// Creates an empty list that holds no backing array yet.
    #[must_use]
    pub fn new(registry: &PoolRegistry) -> Self {
        Self {
            items: PooledArray::new(registry),
        }
    }

    /// Creates an empty list with room for at least `capacity` values before it has to grow.
    #[must_use]
    pub fn with_capacity(registry: &PoolRegistry, capacity: usize) -> Self {
        let mut items = PooledArray::with_size(registry, capacity);

        while items.pop().is_some() {}

        Self { items }
    }

    /// Number of values in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of values the list can hold before it has to grow.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Appends a value.
    pub fn push(&mut self, value: T) {
        let len = self.items.len();

        self.items
            .reallocate(
                len.checked_add(1)
                    .expect("list length is bounded by memory and cannot overflow"),
            )
            .expect("growing a list never shrinks it");

        if let Some(slot) = self.items.last_mut() {
            *slot = value;
        }
    }

    /// Removes and returns the value at `index`, shifting later values one position left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not less than the length.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let size = self.items.len();

        let Some(tail) = self.items.get_mut(index..) else {
            return Err(Error::IndexOutOfBounds { index, size });
        };

        if tail.is_empty() {
            return Err(Error::IndexOutOfBounds { index, size });
        }

        tail.rotate_left(1);

        Ok(self
            .items
            .pop()
            .expect("the list held the value at index, so it is not empty"))
    }

    /// Position of the first value equal to `value`.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.iter().position(|item| item == value)
    }

    /// Removes the first value equal to `value`. Returns whether one was found.
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let Some(index) = self.index_of(value) else {
            return false;
        };

        self.remove_at(index).is_ok()
    }

    /// Releases the backing array to its pool and leaves the list empty.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Detaches the backing array with the current values, leaving the list empty.
    #[must_use]
    pub fn move_to(&mut self) -> PooledArray<T> {
        self.items.take()
    }
}

impl<T: Default + Send + 'static> Deref for PooledList<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T: Default + Send + 'static> DerefMut for PooledList<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl<T: Default + Send + fmt::Debug + 'static> fmt::Debug for PooledList<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
