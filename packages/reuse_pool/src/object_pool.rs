use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::slots::Slots;
use crate::{Lease, ObjectPoolBuilder, Pool, PoolStats};

/// A thread-safe pool of reusable heap-allocated instances of one type.
///
/// Instances are handed out as `Box<T>` and recognized on release by the address of that box,
/// never by value: two instances with equal contents are still distinct. Releasing something the
/// pool did not issue, or releasing twice, is a silent no-op.
///
/// # Slot reuse
///
/// * [`acquire()`][Self::acquire] (unlimited lease) reuses the most recently released slot first.
/// * [`acquire_leased()`][Self::acquire_leased] with [`Lease::Ticks`] scans slots from the oldest
///   and takes the first that is free or whose own bounded lease has run out. In the latter case
///   the previous holder keeps its box but the pool forgets it; the slot receives a new instance.
///
/// Recycled instances pass through the reset hook before they are handed out, fresh instances
/// through the first-use hook.
///
/// # Example
///
/// ```rust
/// use reuse_pool::ObjectPool;
///
/// let pool = ObjectPool::<Vec<u8>>::new();
///
/// let mut buffer = pool.acquire();
/// buffer.extend_from_slice(b"hello");
/// let address = &*buffer as *const Vec<u8>;
///
/// pool.release(buffer);
/// assert_eq!(pool.live_count(), 0);
///
/// // The same allocation comes back. Without a reset hook, contents are left as they were.
/// let buffer = pool.acquire();
/// assert_eq!(&*buffer as *const Vec<u8>, address);
/// assert_eq!(&buffer[..], b"hello");
/// # pool.release(buffer);
/// ```
///
/// # Thread safety
///
/// All operations take `&self` and are guarded by a lock private to this pool, so a pool can be
/// shared between threads (e.g. in an [`Arc`]).
pub struct ObjectPool<T> {
    slots: Slots<Box<T>>,
}

impl<T: Default + Send + 'static> ObjectPool<T> {
    /// Creates a pool with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a pool whose instances are constructed via [`Default`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::<String>::builder()
    ///     .reset(|s| s.clear())
    ///     .build();
    /// # drop(pool);
    /// ```
    pub fn builder() -> ObjectPoolBuilder<T> {
        ObjectPoolBuilder::new()
    }
}

impl<T: Default + Send + 'static> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> ObjectPool<T> {
    /// Starts building a pool whose instances are constructed by `factory`.
    ///
    /// This is the way to pool types that do not implement [`Default`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// struct Connection {
    ///     port: u16,
    /// }
    ///
    /// let pool = ObjectPool::builder_with_factory(|| Connection { port: 8080 }).build();
    ///
    /// let connection = pool.acquire();
    /// assert_eq!(connection.port, 8080);
    /// # pool.release(connection);
    /// ```
    pub fn builder_with_factory<F>(factory: F) -> ObjectPoolBuilder<T>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        ObjectPoolBuilder::with_factory(Box::new(move || Box::new(factory())))
    }

    pub(crate) fn from_slots(slots: Slots<Box<T>>) -> Self {
        Self { slots }
    }

    /// Hands out an instance that stays checked out until released.
    #[must_use]
    pub fn acquire(&self) -> Box<T> {
        self.slots.acquire(Lease::Unlimited)
    }

    /// Hands out an instance under the given lease.
    #[must_use]
    pub fn acquire_leased(&self, lease: Lease) -> Box<T> {
        self.slots.acquire(lease)
    }

    /// Returns an instance to the pool.
    ///
    /// Instances the pool does not currently consider checked out are dropped without any other
    /// effect.
    pub fn release(&self, instance: Box<T>) {
        self.slots.release(instance);
    }

    /// Runs the destroy hook on every idle instance. If no instance is checked out, also drops
    /// all slots, returning the pool to its initial empty state.
    ///
    /// When some instances are checked out, the idle slots stay in place after their destroy hook
    /// ran and can be handed out again later without another destroy call.
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

    /// Number of instances currently checked out.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.live_count()
    }

    /// A snapshot of the pool's counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.slots.stats(type_name::<T>().to_string())
    }

    /// Recounts checked-out slots and compares the result with the live counter.
    ///
    /// Returns `true` if they agree. In debug builds a disagreement also panics.
    #[must_use]
    pub fn check_live_count(&self) -> bool {
        self.slots.check_live_count()
    }
}

impl<T: Send + 'static> Pool for ObjectPool<T> {
    fn item_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn item_type_name(&self) -> String {
        type_name::<T>().to_string()
    }

    fn acquire_any(&self) -> Option<Box<dyn Any + Send>> {
        let instance: Box<dyn Any + Send> = self.acquire();
        Some(instance)
    }

    fn release_any(&self, instance: Box<dyn Any + Send>) {
        match instance.downcast::<T>() {
            Ok(instance) => self.release(instance),
            Err(_) => tracing::trace!(
                pool = type_name::<T>(),
                "ignoring release of an instance of a different type"
            ),
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

impl<T> fmt::Debug for ObjectPool<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(&format!("ObjectPool<{}>", type_name::<T>()))
            .field("slots", &self.slots)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::ptr;
    use std::sync::atomic::{self, AtomicUsize};
    use std::sync::{OnceLock, Weak};
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::ManualTicks;

    assert_impl_all!(ObjectPool<String>: Send, Sync);

    fn address<T>(instance: &T) -> usize {
        ptr::from_ref(instance).addr()
    }

    #[test]
    fn acquire_hooks_may_call_back_into_pool() {
        let pool_handle: Arc<OnceLock<Weak<ObjectPool<u64>>>> = Arc::default();
        let seen_by_reset = Arc::new(AtomicUsize::new(usize::MAX));
        let seen_by_first_use = Arc::new(AtomicUsize::new(usize::MAX));

        let live_count_of = |handle: &OnceLock<Weak<ObjectPool<u64>>>| {
            handle
                .get()
                .and_then(Weak::upgrade)
                .map_or(usize::MAX, |pool| pool.live_count())
        };

        let pool = Arc::new(
            ObjectPool::<u64>::builder()
                .reset({
                    let handle = Arc::clone(&pool_handle);
                    let seen = Arc::clone(&seen_by_reset);
                    move |_| seen.store(live_count_of(&handle), atomic::Ordering::Relaxed)
                })
                .first_use({
                    let handle = Arc::clone(&pool_handle);
                    let seen = Arc::clone(&seen_by_first_use);
                    move |_| seen.store(live_count_of(&handle), atomic::Ordering::Relaxed)
                })
                .build(),
        );
        pool_handle.set(Arc::downgrade(&pool)).unwrap();

        let fresh = pool.acquire();
        assert_eq!(seen_by_first_use.load(atomic::Ordering::Relaxed), 1);
        pool.release(fresh);

        let recycled = pool.acquire();
        assert_eq!(seen_by_reset.load(atomic::Ordering::Relaxed), 1);
        pool.release(recycled);
    }

    #[test]
    fn release_restores_live_count() {
        let pool = ObjectPool::<u64>::new();
        assert_eq!(pool.live_count(), 0);

        let a = pool.acquire();
        assert_eq!(pool.live_count(), 1);

        pool.release(a);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.len(), 1);
        assert!(pool.check_live_count());
    }

    #[test]
    fn live_instances_never_share_a_slot() {
        let pool = ObjectPool::<u64>::new();

        let instances: Vec<_> = (0..20).map(|_| pool.acquire()).collect();

        let mut addresses: Vec<_> = instances.iter().map(|i| address(&**i)).collect();
        addresses.sort_unstable();
        addresses.dedup();

        assert_eq!(addresses.len(), 20);
        assert_eq!(pool.len(), 20);
        assert_eq!(pool.live_count(), 20);

        for instance in instances {
            pool.release(instance);
        }

        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn unlimited_lease_reuses_most_recently_released_first() {
        let pool = ObjectPool::<u64>::new();

        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();

        let (addr_a, addr_b, addr_c) = (address(&*a), address(&*b), address(&*c));

        pool.release(a);
        pool.release(c);
        pool.release(b);

        let first = pool.acquire();
        assert_eq!(address(&*first), addr_b);

        let second = pool.acquire();
        assert_eq!(address(&*second), addr_c);

        pool.release(second);

        let third = pool.acquire();
        assert_eq!(address(&*third), addr_c);

        let fourth = pool.acquire();
        assert_eq!(address(&*fourth), addr_a);

        assert_eq!(pool.len(), 3);

        pool.release(first);
        pool.release(third);
        pool.release(fourth);
    }

    #[test]
    fn bounded_lease_reclaims_after_expiry_only() {
        let ticks = Arc::new(ManualTicks::new(1_000));
        let pool = ObjectPool::<u64>::builder()
            .tick_source(Arc::<ManualTicks>::clone(&ticks))
            .build();

        let leaked = pool.acquire_leased(Lease::Ticks(5));

        ticks.advance(4);
        let fresh = pool.acquire_leased(Lease::Ticks(5));
        assert_eq!(pool.len(), 2, "slot must not be reclaimed after 4 ticks");

        ticks.advance(2);
        let reclaimed = pool.acquire_leased(Lease::Ticks(5));
        assert_eq!(pool.len(), 2, "slot must be reclaimed after 6 ticks");
        assert_eq!(pool.live_count(), 2);

        pool.release(leaked);
        assert_eq!(pool.live_count(), 2, "detached instance release is a no-op");

        pool.release(fresh);
        pool.release(reclaimed);
        assert_eq!(pool.live_count(), 0);
        assert!(pool.check_live_count());
    }

    #[test]
    fn bounded_lease_prefers_oldest_free_slot() {
        let ticks = Arc::new(ManualTicks::new(0));
        let pool = ObjectPool::<u64>::builder()
            .tick_source(Arc::<ManualTicks>::clone(&ticks))
            .build();

        let a = pool.acquire();
        let b = pool.acquire();
        let addr_a = address(&*a);

        // The free-index stack now prefers `b`, the scan still finds `a` first.
        pool.release(a);
        pool.release(b);

        let leased = pool.acquire_leased(Lease::Ticks(10));
        assert_eq!(address(&*leased), addr_a);

        pool.release(leased);
    }

    #[test]
    fn bounded_lease_survives_tick_wraparound() {
        let ticks = Arc::new(ManualTicks::new(u32::MAX - 1));
        let pool = ObjectPool::<u64>::builder()
            .tick_source(Arc::<ManualTicks>::clone(&ticks))
            .build();

        let leaked = pool.acquire_leased(Lease::Ticks(5));

        // Counter wraps; only 3 ticks have really passed.
        ticks.advance(3);
        let other = pool.acquire_leased(Lease::Ticks(5));
        assert_eq!(pool.len(), 2);

        ticks.advance(3);
        let reclaimed = pool.acquire_leased(Lease::Ticks(5));
        assert_eq!(pool.len(), 2);

        drop(leaked);
        pool.release(other);
        pool.release(reclaimed);
    }

    #[test]
    fn unlimited_lease_ignores_expired_checkouts() {
        let ticks = Arc::new(ManualTicks::new(0));
        let pool = ObjectPool::<u64>::builder()
            .tick_source(Arc::<ManualTicks>::clone(&ticks))
            .build();

        let leaked = pool.acquire_leased(Lease::Ticks(1));
        ticks.advance(100);

        let other = pool.acquire();
        assert_eq!(pool.len(), 2);

        pool.release(leaked);
        pool.release(other);
    }

    #[test]
    fn foreign_and_double_release_are_noops() {
        let pool = ObjectPool::<u64>::new();

        let a = pool.acquire();
        pool.release(Box::new(5));
        assert_eq!(pool.live_count(), 1);

        pool.release(a);
        assert_eq!(pool.live_count(), 0);

        // Identity equality: an equal value is still a different instance.
        let b = pool.acquire();
        pool.release(Box::new(*b));
        assert_eq!(pool.live_count(), 1);

        pool.release(b);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn clear_unused_resets_idle_pool() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let pool = {
            let destroyed = Arc::clone(&destroyed);
            ObjectPool::<u64>::builder()
                .on_destroy(move |_| {
                    destroyed.fetch_add(1, atomic::Ordering::Relaxed);
                })
                .build()
        };

        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);

        pool.clear_unused();

        assert_eq!(destroyed.load(atomic::Ordering::Relaxed), 2);
        assert!(pool.is_empty());
        assert_eq!(pool.stats().total_object_count(), 0);
    }

    #[test]
    fn clear_unused_with_live_instances_keeps_slots() {
        // Destroyed slots stay structurally present and are handed out again without another
        // destroy call.
        let destroyed = Arc::new(AtomicUsize::new(0));
        let pool = {
            let destroyed = Arc::clone(&destroyed);
            ObjectPool::<u64>::builder()
                .on_destroy(move |_| {
                    destroyed.fetch_add(1, atomic::Ordering::Relaxed);
                })
                .build()
        };

        let live = pool.acquire();
        let idle = pool.acquire();
        let idle_address = address(&*idle);
        pool.release(idle);

        pool.clear_unused();
        assert_eq!(destroyed.load(atomic::Ordering::Relaxed), 1);
        assert_eq!(pool.len(), 2);

        let reused = pool.acquire();
        assert_eq!(address(&*reused), idle_address);
        assert_eq!(destroyed.load(atomic::Ordering::Relaxed), 1);

        pool.release(live);
        pool.release(reused);
    }

    #[test]
    fn erased_release_routes_by_type() {
        let pool = ObjectPool::<u64>::new();

        let erased = pool.acquire_any().unwrap();
        assert_eq!(pool.live_count(), 1);

        pool.release_any(Box::new("not a u64"));
        assert_eq!(pool.live_count(), 1);

        pool.release_any(erased);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn concurrent_acquire_and_release() {
        let pool = Arc::new(ObjectPool::<Vec<u32>>::new());

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..1_000 {
                        let mut v = pool.acquire();
                        v.push(i);
                        pool.release(v);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(pool.live_count(), 0);
        assert!(pool.len() <= 4);
        assert!(pool.check_live_count());
    }
}
