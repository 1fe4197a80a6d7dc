use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::slots::Slots;
use crate::{ArrayPoolBuilder, Lease, Pool, PoolStats};

/// A thread-safe pool of reusable fixed-length arrays.
///
/// Behaves like [`ObjectPool`][crate::ObjectPool] with `[T]` of one fixed length as the instance
/// type, with one difference: every array is handed out filled with `T::default()`, whether it
/// was just constructed or recycled.
///
/// Arrays are recognized on release by the address of their data, and only arrays of exactly
/// this pool's length can ever match.
///
/// # Example
///
/// ```rust
/// use reuse_pool::ArrayPool;
///
/// let pool = ArrayPool::<u32>::new(4);
///
/// let mut indices = pool.acquire();
/// indices.copy_from_slice(&[0, 1, 2, 0]);
/// pool.release(indices);
///
/// let indices = pool.acquire();
/// assert_eq!(&*indices, &[0, 0, 0, 0]);
/// # pool.release(indices);
/// ```
pub struct ArrayPool<T> {
    slots: Slots<Box<[T]>>,
    length: usize,
}

impl<T: Default + Send + 'static> ArrayPool<T> {
    /// Creates a pool of arrays of `length` elements with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if `length` is zero or `T` is zero-sized.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self::builder(length).build()
    }

    /// Starts building a pool of arrays of `length` elements.
    pub fn builder(length: usize) -> ArrayPoolBuilder<T> {
        ArrayPoolBuilder::new(length)
    }

    pub(crate) fn from_slots(slots: Slots<Box<[T]>>, length: usize) -> Self {
        Self { slots, length }
    }

    /// The length of every array in this pool.
    #[must_use]
    pub fn array_length(&self) -> usize {
        self.length
    }

    /// Hands out an array filled with default values that stays checked out until released.
    #[must_use]
    pub fn acquire(&self) -> Box<[T]> {
        self.acquire_leased(Lease::Unlimited)
    }

    /// Hands out an array filled with default values under the given lease.
    #[must_use]
    pub fn acquire_leased(&self, lease: Lease) -> Box<[T]> {
        let mut array = self.slots.acquire(lease);
        array.fill_with(T::default);
        array
    }

    /// Returns an array to the pool.
    ///
    /// Arrays of a different length, arrays the pool did not issue and arrays that were already
    /// released are dropped without any other effect.
    pub fn release(&self, array: Box<[T]>) {
        if array.len() != self.length {
            return;
        }

        self.slots.release(array);
    }

    /// Runs the destroy hook on every idle array. If no array is checked out, also drops all
    /// slots, returning the pool to its initial empty state.
    pub fn clear_unused(&self) {
        self.slots.clear_unused();
    }

    /// Number of slots in the pool, idle or checked out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of arrays currently checked out.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.live_count()
    }

    /// A snapshot of the pool's counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.slots.stats(self.item_type_name())
    }

    /// Recounts checked-out slots and compares the result with the live counter.
    ///
    /// Returns `true` if they agree. In debug builds a disagreement also panics.
    #[must_use]
    pub fn check_live_count(&self) -> bool {
        self.slots.check_live_count()
    }

    fn item_type_name(&self) -> String {
        format!("{}[{}]", type_name::<T>(), self.length)
    }
}

impl<T: Default + Send + 'static> Pool for ArrayPool<T> {
    fn item_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn item_type_name(&self) -> String {
        Self::item_type_name(self)
    }

    fn array_length(&self) -> Option<usize> {
        Some(self.length)
    }

    /// The erased form of an array is a `Box<Box<[T]>>`.
    fn acquire_any(&self) -> Option<Box<dyn Any + Send>> {
        let array: Box<dyn Any + Send> = Box::new(self.acquire());
        Some(array)
    }

    fn release_any(&self, instance: Box<dyn Any + Send>) {
        if let Ok(array) = instance.downcast::<Box<[T]>>() {
            self.release(*array);
        }
    }

    fn clear_unused(&self) {
        Self::clear_unused(self);
    }

    fn stats(&self) -> PoolStats {
        Self::stats(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T> fmt::Debug for ArrayPool<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(&format!("ArrayPool<{}>", type_name::<T>()))
            .field("length", &self.length)
            .field("slots", &self.slots)
            .finish()
    }
}
