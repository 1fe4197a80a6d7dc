use std::fmt;
use std::iter;
use std::sync::Arc;

use crate::constants::DEFAULT_INITIAL_CAPACITY;
use crate::slots::{Factory, Hooks, MemorySnapshot, Slots};
use crate::{ArrayPool, ObjectPool, SystemTicks, TickSource};

/// Builder for creating an instance of [`ObjectPool`].
///
/// Every setting is optional. Without a [`factory()`][Self::factory], instances are constructed
/// via [`Default`].
///
/// # Examples
///
/// ```
/// use reuse_pool::ObjectPool;
///
/// let pool = ObjectPool::<Vec<u32>>::builder()
///     .initial_capacity(64)
///     .reset(|v| v.clear())
///     .first_use(|v| v.reserve(1024))
///     .build();
///
/// let mut buffer = pool.acquire();
/// buffer.push(7);
/// pool.release(buffer);
///
/// // The recycled buffer was cleared by the reset hook but kept its capacity.
/// let buffer = pool.acquire();
/// assert!(buffer.is_empty());
/// assert!(buffer.capacity() >= 1024);
/// # pool.release(buffer);
/// ```
#[must_use]
pub struct ObjectPoolBuilder<T> {
    initial_capacity: usize,
    factory: Factory<Box<T>>,
    hooks: Hooks<Box<T>>,
    tick_source: Option<Arc<dyn TickSource>>,
    memory_snapshot: Option<MemorySnapshot>,
}

impl<T: Send + 'static> ObjectPoolBuilder<T> {
    pub(crate) fn new() -> Self
    where
        T: Default,
    {
        Self::with_factory(Box::new(Box::<T>::default))
    }

    pub(crate) fn with_factory(factory: Factory<Box<T>>) -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            factory,
            hooks: Hooks::default(),
            tick_source: None,
            memory_snapshot: None,
        }
    }

    /// Sets how many slots the pool reserves bookkeeping space for up front.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Replaces the constructor used when the pool has no idle instance to hand out.
    ///
    /// Runs while the pool's lock is held, so it must not call back into the same pool.
    ///
    /// # Examples
    ///
    /// ```
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::<String>::builder()
    ///     .factory(|| String::with_capacity(256))
    ///     .build();
    ///
    /// let s = pool.acquire();
    /// assert!(s.capacity() >= 256);
    /// # pool.release(s);
    /// ```
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factory = Box::new(move || Box::new(factory()));
        self
    }

    /// Sets a hook that runs on a recycled instance right before it is handed out again.
    ///
    /// Runs after the pool's lock is released, so it may call back into the same pool.
    pub fn reset<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.hooks.reset = Some(Box::new(move |instance: &mut Box<T>| hook(&mut **instance)));
        self
    }

    /// Sets a hook that runs once on every freshly constructed instance.
    ///
    /// Runs after the pool's lock is released, so it may call back into the same pool.
    pub fn first_use<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.hooks.first_use = Some(Box::new(move |instance: &mut Box<T>| hook(&mut **instance)));
        self
    }

    /// Sets a hook that runs on every instance released back into the pool.
    ///
    /// Runs while the pool's lock is held, so it must not call back into the same pool.
    pub fn on_return<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.hooks.on_return = Some(Box::new(move |instance: &mut Box<T>| hook(&mut **instance)));
        self
    }

    /// Sets a hook that runs on every idle instance when the pool is swept.
    ///
    /// Runs while the pool's lock is held, so it must not call back into the same pool.
    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.hooks.on_destroy =
            Some(Box::new(move |instance: &mut Box<T>| hook(&mut **instance)));
        self
    }

    /// Sets the clock used to timestamp checkouts and evaluate leases.
    ///
    /// Defaults to a new [`SystemTicks`].
    pub fn tick_source(mut self, tick_source: Arc<dyn TickSource>) -> Self {
        self.tick_source = Some(tick_source);
        self
    }

    /// Sets the memory gauge read around the first construction to estimate instance size.
    ///
    /// Without a gauge, the size of the instance itself (without anything it points to) is used.
    pub fn memory_snapshot(mut self, snapshot: MemorySnapshot) -> Self {
        self.memory_snapshot = Some(snapshot);
        self
    }

    /// Builds the pool.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized. Boxes of zero-sized types share one address, so the pool
    /// could not tell the instances apart when they are released.
    #[must_use]
    pub fn build(self) -> ObjectPool<T> {
        assert!(
            size_of::<T>() > 0,
            "ObjectPool must have non-zero item size"
        );

        ObjectPool::from_slots(Slots::new(
            self.initial_capacity,
            self.factory,
            self.hooks,
            self.tick_source
                .unwrap_or_else(|| Arc::new(SystemTicks::new())),
            self.memory_snapshot,
        ))
    }
}

impl<T> fmt::Debug for ObjectPoolBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPoolBuilder")
            .field("initial_capacity", &self.initial_capacity)
            .field("tick_source", &self.tick_source)
            .field("has_memory_snapshot", &self.memory_snapshot.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for creating an instance of [`ArrayPool`].
///
/// The array length is fixed by [`ArrayPool::builder()`]; everything else is optional.
///
/// Unless replaced via [`on_destroy()`][Self::on_destroy], idle arrays are overwritten with
/// default values when the pool is swept. Arrays are always handed out filled with default
/// values, whatever the hooks do.
///
/// # Examples
///
/// ```
/// use reuse_pool::ArrayPool;
///
/// let pool = ArrayPool::<f32>::builder(16).initial_capacity(4).build();
///
/// let mut samples = pool.acquire();
/// assert_eq!(samples.len(), 16);
/// samples[0] = 1.5;
///
/// pool.release(samples);
/// ```
#[must_use]
pub struct ArrayPoolBuilder<T> {
    length: usize,
    initial_capacity: usize,
    hooks: Hooks<Box<[T]>>,
    tick_source: Option<Arc<dyn TickSource>>,
    memory_snapshot: Option<MemorySnapshot>,
}

impl<T: Default + Send + 'static> ArrayPoolBuilder<T> {
    pub(crate) fn new(length: usize) -> Self {
        Self {
            length,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            hooks: Hooks {
                on_destroy: Some(Box::new(|array: &mut Box<[T]>| {
                    array.fill_with(T::default);
                })),
                ..Hooks::default()
            },
            tick_source: None,
            memory_snapshot: None,
        }
    }

    /// Sets how many slots the pool reserves bookkeeping space for up front.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets a hook that runs on a recycled array right before it is handed out again.
    ///
    /// Runs after the pool's lock is released, so it may call back into the same pool.
    pub fn reset<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut [T]) + Send + Sync + 'static,
    {
        self.hooks.reset = Some(Box::new(move |array: &mut Box<[T]>| hook(&mut **array)));
        self
    }

    /// Sets a hook that runs once on every freshly constructed array.
    ///
    /// Runs after the pool's lock is released, so it may call back into the same pool.
    pub fn first_use<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut [T]) + Send + Sync + 'static,
    {
        self.hooks.first_use = Some(Box::new(move |array: &mut Box<[T]>| hook(&mut **array)));
        self
    }

    /// Sets a hook that runs on every array released back into the pool.
    ///
    /// Runs while the pool's lock is held, so it must not call back into the same pool.
    pub fn on_return<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut [T]) + Send + Sync + 'static,
    {
        self.hooks.on_return = Some(Box::new(move |array: &mut Box<[T]>| hook(&mut **array)));
        self
    }

    /// Replaces the hook that runs on every idle array when the pool is swept.
    ///
    /// Runs while the pool's lock is held, so it must not call back into the same pool.
    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut [T]) + Send + Sync + 'static,
    {
        self.hooks.on_destroy = Some(Box::new(move |array: &mut Box<[T]>| hook(&mut **array)));
        self
    }

    /// Sets the clock used to timestamp checkouts and evaluate leases.
    ///
    /// Defaults to a new [`SystemTicks`].
    pub fn tick_source(mut self, tick_source: Arc<dyn TickSource>) -> Self {
        self.tick_source = Some(tick_source);
        self
    }

    /// Sets the memory gauge read around the first construction to estimate array size.
    pub fn memory_snapshot(mut self, snapshot: MemorySnapshot) -> Self {
        self.memory_snapshot = Some(snapshot);
        self
    }

    /// Builds the pool.
    ///
    /// # Panics
    ///
    /// Panics if the array length is zero or `T` is zero-sized. Such arrays have no heap
    /// allocation of their own, so the pool could not tell them apart when they are released.
    #[must_use]
    pub fn build(self) -> ArrayPool<T> {
        assert!(self.length > 0, "ArrayPool must have non-zero array length");
        assert!(
            size_of::<T>() > 0,
            "ArrayPool must have non-zero element size"
        );

        let length = self.length;

        let factory: Factory<Box<[T]>> = Box::new(move || {
            iter::repeat_with(T::default)
                .take(length)
                .collect::<Box<[T]>>()
        });

        ArrayPool::from_slots(
            Slots::new(
                self.initial_capacity,
                factory,
                self.hooks,
                self.tick_source
                    .unwrap_or_else(|| Arc::new(SystemTicks::new())),
                self.memory_snapshot,
            ),
            length,
        )
    }
}

impl<T> fmt::Debug for ArrayPoolBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayPoolBuilder")
            .field("length", &self.length)
            .field("initial_capacity", &self.initial_capacity)
            .field("tick_source", &self.tick_source)
            .field("has_memory_snapshot", &self.memory_snapshot.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{self, AtomicUsize};

    use super::*;
    use crate::Pool;

    #[test]
    fn hooks_run_at_their_lifecycle_points() {
        let first_use = Arc::new(AtomicUsize::new(0));
        let reset = Arc::new(AtomicUsize::new(0));
        let returned = Arc::new(AtomicUsize::new(0));

        let pool = {
            let first_use = Arc::clone(&first_use);
            let reset = Arc::clone(&reset);
            let returned = Arc::clone(&returned);

            ObjectPool::<u32>::builder()
                .first_use(move |_| {
                    first_use.fetch_add(1, atomic::Ordering::Relaxed);
                })
                .reset(move |_| {
                    reset.fetch_add(1, atomic::Ordering::Relaxed);
                })
                .on_return(move |_| {
                    returned.fetch_add(1, atomic::Ordering::Relaxed);
                })
                .build()
        };

        let a = pool.acquire();
        assert_eq!(first_use.load(atomic::Ordering::Relaxed), 1);
        assert_eq!(reset.load(atomic::Ordering::Relaxed), 0);

        pool.release(a);
        assert_eq!(returned.load(atomic::Ordering::Relaxed), 1);

        let a = pool.acquire();
        assert_eq!(first_use.load(atomic::Ordering::Relaxed), 1);
        assert_eq!(reset.load(atomic::Ordering::Relaxed), 1);

        pool.release(a);
        assert_eq!(returned.load(atomic::Ordering::Relaxed), 2);
    }

    #[test]
    fn custom_factory_is_used() {
        let pool = ObjectPool::<String>::builder()
            .factory(|| "fresh".to_string())
            .build();

        let s = pool.acquire();
        assert_eq!(*s, "fresh");

        pool.release(s);
    }

    #[test]
    fn array_destroy_hook_can_be_replaced() {
        let destroyed = Arc::new(AtomicUsize::new(0));

        let pool = {
            let destroyed = Arc::clone(&destroyed);

            ArrayPool::<u8>::builder(3)
                .on_destroy(move |array| {
                    assert_eq!(array, &[1, 2, 3]);
                    destroyed.fetch_add(1, atomic::Ordering::Relaxed);
                })
                .build()
        };

        let keep = pool.acquire();
        let mut idle = pool.acquire();
        idle.copy_from_slice(&[1, 2, 3]);
        pool.release(idle);

        // One array is still live, so the idle one is destroyed in place and its slot stays.
        pool.clear_unused();
        assert_eq!(destroyed.load(atomic::Ordering::Relaxed), 1);
        assert_eq!(pool.len(), 2);

        pool.release(keep);
    }

    #[test]
    #[should_panic(expected = "ObjectPool must have non-zero item size")]
    fn zero_sized_items_rejected() {
        drop(ObjectPool::<()>::builder().build());
    }

    #[test]
    #[should_panic(expected = "ArrayPool must have non-zero array length")]
    fn zero_length_arrays_rejected() {
        drop(ArrayPool::<u32>::builder(0).build());
    }
}
