use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};

use crate::{Error, PoolRegistry, Result, calc_capacity};

const ERR_SIZE_WITHIN_CAPACITY: &str = "logical size never exceeds the backing array length";

/// A growable buffer whose backing array is borrowed from a [`PoolRegistry`] array pool.
///
/// The buffer has a logical size (the number of valid elements, exposed through [`Deref`] as a
/// slice) and a capacity (the length of the backing array). Growing past the capacity swaps in a
/// larger pooled array, with the larger length picked by [`calc_capacity()`] so that buffers of
/// similar sizes share pools. The previous backing array goes back to its pool.
///
/// Dropping the buffer, or calling [`clear()`][Self::clear], returns the backing array to its
/// pool. The buffer has a single owner; [`take()`][Self::take] moves its contents out and leaves
/// an empty buffer behind.
///
/// # Example
///
/// ```rust
/// use reuse_pool::{PooledArray, PoolRegistry};
///
/// let registry = PoolRegistry::new();
///
/// let mut vertices = PooledArray::<f32>::new(&registry);
/// vertices.reallocate(6)?;
/// vertices.copy_from_slice(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
///
/// assert_eq!(vertices.len(), 6);
/// assert_eq!(vertices.capacity(), 11);
/// # Ok::<(), reuse_pool::Error>(())
/// ```
pub struct PooledArray<T: Default + Send + 'static> {
    registry: PoolRegistry,

    /// Empty when no backing array is held.
    items: Box<[T]>,

    size: usize,
}

impl<T: Default + Send + 'static> PooledArray<T> {
    /// Creates an empty buffer that holds no backing array yet.
    #[must_use]
    pub fn new(registry: &PoolRegistry) -> Self {
        Self {
            registry: registry.clone(),
            items: Box::default(),
            size: 0,
        }
    }

    /// Creates a buffer of `size` default values.
    #[must_use]
    pub fn with_size(registry: &PoolRegistry, size: usize) -> Self {
        let mut array = Self::new(registry);
        array.grow(size);
        array
    }

    /// Creates a buffer holding clones of the elements of `source`.
    #[must_use]
    pub fn from_slice(registry: &PoolRegistry, source: &[T]) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_size(registry, source.len());
        array.clone_from_slice(source);
        array
    }

    /// Creates a buffer holding the elements of `source`.
    #[must_use]
    pub fn from_vec(registry: &PoolRegistry, source: Vec<T>) -> Self {
        let mut array = Self::with_size(registry, source.len());

        for (slot, item) in array.iter_mut().zip(source) {
            *slot = item;
        }

        array
    }

    /// Number of valid elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether there are no valid elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Length of the backing array, zero if none is held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Changes the logical size to `new_size`, growing the backing array if it is too short.
    ///
    /// Existing elements are kept; new elements have their default value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShrinkBelowSize`] if `new_size` is smaller than the current size. The
    /// buffer never drops valid elements implicitly.
    pub fn reallocate(&mut self, new_size: usize) -> Result<()> {
        if new_size < self.size {
            return Err(Error::ShrinkBelowSize {
                requested: new_size,
                size: self.size,
            });
        }

        self.grow(new_size);
        Ok(())
    }

    /// Releases the backing array to its pool and resets the buffer to empty.
    pub fn clear(&mut self) {
        let items = mem::take(&mut self.items);
        self.size = 0;

        self.registry.release(items);
    }

    /// Moves the contents into a new buffer, leaving this one empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let empty = Self::new(&self.registry);
        mem::replace(self, empty)
    }

    /// Clones the valid elements into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.as_slice().to_vec()
    }

    /// Replaces the contents of `target` with clones of the valid elements.
    pub fn copy_into(&self, target: &mut Vec<T>)
    where
        T: Clone,
    {
        target.clear();
        target.extend_from_slice(self.as_slice());
    }

    /// The valid elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.items
            .get(..self.size)
            .expect(ERR_SIZE_WITHIN_CAPACITY)
    }

    /// The valid elements, mutably.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.items
            .get_mut(..self.size)
            .expect(ERR_SIZE_WITHIN_CAPACITY)
    }

    /// Removes the last valid element, leaving a default value in its slot.
    pub(crate) fn pop(&mut self) -> Option<T> {
        let last = self.size.checked_sub(1)?;
        let item = self.items.get_mut(last).map(mem::take);

        self.size = last;
        item
    }

    #[cfg(test)]
    pub(crate) fn backing(&self) -> &[T] {
        &self.items
    }

    /// Grows the logical size to `new_size`, which must not be smaller than the current size.
    fn grow(&mut self, new_size: usize) {
        debug_assert!(new_size >= self.size);

        if new_size > self.capacity() {
            let mut grown = self.registry.acquire_array::<T>(calc_capacity(new_size));

            for (target, source) in grown.iter_mut().zip(self.as_mut_slice()) {
                mem::swap(target, source);
            }

            let previous = mem::replace(&mut self.items, grown);
            self.registry.release(previous);
        } else if let Some(added) = self.items.get_mut(self.size..new_size) {
            // Slots past the logical size may hold leftovers from before a release.
            added.fill_with(T::default);
        }

        self.size = new_size;
    }
}

impl<T: Default + Send + 'static> Deref for PooledArray<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: Default + Send + 'static> DerefMut for PooledArray<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: Default + Send + 'static> Drop for PooledArray<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Default + Send + fmt::Debug + 'static> fmt::Debug for PooledArray<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledArray")
            .field("items", &self.as_slice())
            .field("capacity", &self.capacity())
            .finish()
    }
}
