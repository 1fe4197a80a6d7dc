use std::any::{Any, TypeId, type_name};
use std::collections::{HashMap as StdHashMap, HashSet as StdHashSet};
use std::fmt;
use std::hash::Hash;
use std::iter;
use std::sync::{Arc, Mutex, MutexGuard};

use foldhash::HashMap;

use crate::constants::{DEFAULT_INITIAL_CAPACITY, ERR_POISONED_LOCK};
use crate::slots::MemorySnapshot;
use crate::{
    ArrayPool, ArrayPoolBuilder, Collection, Lease, ObjectPool, ObjectPoolBuilder, Pool, PoolOrder,
    PoolStats, Recyclable, SystemTicks, TickSource,
};

/// Extracts the element type and length from a type-erased `Box<[T]>`.
type ArrayRoute = fn(&(dyn Any + Send)) -> Option<(TypeId, usize)>;

fn route_array<T: 'static>(instance: &(dyn Any + Send)) -> Option<(TypeId, usize)> {
    instance
        .downcast_ref::<Box<[T]>>()
        .map(|array| (TypeId::of::<T>(), array.len()))
}

/// A directory of pools, keyed by item type for object pools and by element type and length for
/// array pools.
///
/// Pools are created on first use with the registry's configuration and live as long as the
/// registry. Instances go back to the registry through [`release()`][Self::release], which finds
/// the owning pool without creating one: releasing something no pool was ever created for is a
/// no-op.
///
/// This type acts as a cloneable handle to shared registry state. Clones are cheap and all refer
/// to the same pools, so one registry can be created at startup and handed to every component
/// that needs it.
///
/// # Example
///
/// ```rust
/// use reuse_pool::PoolRegistry;
///
/// let registry = PoolRegistry::new();
///
/// let mut samples = registry.acquire_array::<f32>(256);
/// samples[0] = 1.0;
/// registry.release(samples);
///
/// let mut names = registry.acquire_vec::<String>();
/// names.push("north".to_string());
/// registry.release_collection(names);
///
/// // Idle instances are reclaimed by a periodic sweep.
/// registry.sweep();
/// ```
///
/// # Thread safety
///
/// The registry guards its maps with its own lock, distinct from the locks of the pools it holds.
/// Pool lookups hold the registry lock only while finding or creating the pool.
#[derive(Clone)]
pub struct PoolRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    config: RegistryConfig,
    state: Mutex<RegistryState>,
}

struct RegistryConfig {
    initial_capacity: usize,
    tick_source: Arc<dyn TickSource>,
    memory_snapshot: Option<MemorySnapshot>,
}

impl RegistryConfig {
    fn object_pool_builder<T: Default + Send + 'static>(&self) -> ObjectPoolBuilder<T> {
        let builder = ObjectPool::<T>::builder()
            .initial_capacity(self.initial_capacity)
            .tick_source(Arc::clone(&self.tick_source));

        match &self.memory_snapshot {
            Some(snapshot) => builder.memory_snapshot(Arc::clone(snapshot)),
            None => builder,
        }
    }

    fn array_pool_builder<T: Default + Send + 'static>(
        &self,
        length: usize,
    ) -> ArrayPoolBuilder<T> {
        let builder = ArrayPool::<T>::builder(length)
            .initial_capacity(self.initial_capacity)
            .tick_source(Arc::clone(&self.tick_source));

        match &self.memory_snapshot {
            Some(snapshot) => builder.memory_snapshot(Arc::clone(snapshot)),
            None => builder,
        }
    }
}

#[derive(Default)]
struct RegistryState {
    object_pools: HashMap<TypeId, Arc<dyn Pool>>,

    /// Element type, then array length.
    array_pools: HashMap<TypeId, HashMap<usize, Arc<dyn Pool>>>,

    /// Keyed by the type id of `Box<[T]>`, for routing type-erased arrays.
    array_routes: HashMap<TypeId, ArrayRoute>,

    /// Every pool, in registration order.
    all_pools: Vec<Arc<dyn Pool>>,
}

impl RegistryState {
    fn object_pool(&self, item_type: TypeId) -> Option<Arc<dyn Pool>> {
        self.object_pools.get(&item_type).map(Arc::clone)
    }

    fn array_pool(&self, element_type: TypeId, length: usize) -> Option<Arc<dyn Pool>> {
        self.array_pools
            .get(&element_type)
            .and_then(|by_length| by_length.get(&length))
            .map(Arc::clone)
    }

    fn insert_object_pool(&mut self, item_type: TypeId, pool: Arc<dyn Pool>) -> bool {
        if self.object_pools.contains_key(&item_type) {
            return false;
        }

        self.object_pools.insert(item_type, Arc::clone(&pool));
        self.all_pools.push(pool);
        true
    }

    fn insert_array_pool(
        &mut self,
        element_type: TypeId,
        length: usize,
        pool: Arc<dyn Pool>,
    ) -> bool {
        let by_length = self.array_pools.entry(element_type).or_default();

        if by_length.contains_key(&length) {
            return false;
        }

        by_length.insert(length, Arc::clone(&pool));
        self.all_pools.push(pool);
        true
    }

    fn register_array_route<T: 'static>(&mut self) {
        self.array_routes
            .entry(TypeId::of::<Box<[T]>>())
            .or_insert(route_array::<T>);
    }
}

/// Downcasts a registered pool to its concrete type, if it is one.
fn typed_pool<P: Pool>(pool: &Arc<dyn Pool>) -> Option<Arc<P>> {
    Arc::clone(pool).into_any().downcast::<P>().ok()
}

impl PoolRegistry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a registry with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use reuse_pool::{ManualTicks, PoolRegistry};
    ///
    /// let ticks = Arc::new(ManualTicks::new(0));
    ///
    /// let registry = PoolRegistry::builder()
    ///     .initial_capacity(64)
    ///     .tick_source(ticks)
    ///     .build();
    /// # drop(registry);
    /// ```
    pub fn builder() -> PoolRegistryBuilder {
        PoolRegistryBuilder::new()
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.state.lock().expect(ERR_POISONED_LOCK)
    }

    /// Returns the pool registered for `T`, creating an [`ObjectPool`] if there is none.
    ///
    /// Returns `None` for a zero-sized `T` without a registered pool: such instances cannot be
    /// told apart by address, so no pool is created for them.
    fn object_pool_entry<T: Default + Send + 'static>(&self) -> Option<Arc<dyn Pool>> {
        if let Some(pool) = self.find_object_pool(TypeId::of::<T>()) {
            return Some(pool);
        }

        if size_of::<T>() == 0 {
            return None;
        }

        // Built without holding the registry lock; if another thread registered a pool in the
        // meantime, that one wins and this one is dropped.
        let created: Arc<dyn Pool> =
            Arc::new(self.inner.config.object_pool_builder::<T>().build());

        let mut state = self.state();

        if let Some(pool) = state.object_pool(TypeId::of::<T>()) {
            return Some(pool);
        }

        tracing::debug!(item_type = type_name::<T>(), "creating object pool");
        state.insert_object_pool(TypeId::of::<T>(), Arc::clone(&created));

        Some(created)
    }

    /// Returns the pool registered for arrays of `T` with `length` elements, creating an
    /// [`ArrayPool`] if there is none. Returns `None` for zero-sized elements without a
    /// registered pool.
    fn array_pool_entry<T: Default + Send + 'static>(
        &self,
        length: usize,
    ) -> Option<Arc<dyn Pool>> {
        if let Some(pool) = self.find_array_pool(TypeId::of::<T>(), length) {
            return Some(pool);
        }

        if size_of::<T>() == 0 {
            return None;
        }

        let created: Arc<dyn Pool> =
            Arc::new(self.inner.config.array_pool_builder::<T>(length).build());

        let mut state = self.state();

        if let Some(pool) = state.array_pool(TypeId::of::<T>(), length) {
            return Some(pool);
        }

        tracing::debug!(
            element_type = type_name::<T>(),
            length,
            "creating array pool"
        );
        state.insert_array_pool(TypeId::of::<T>(), length, Arc::clone(&created));
        state.register_array_route::<T>();

        Some(created)
    }

    /// Returns the object pool for `T`, creating it if it does not exist yet.
    ///
    /// Returns `None` for a zero-sized `T`, for which there is no pool, and (logging an error)
    /// if a pool of a different implementation was registered for `T` via
    /// [`add_pool()`][Self::add_pool] or [`check_pool()`][Self::check_pool].
    #[must_use]
    pub fn object_pool<T: Default + Send + 'static>(&self) -> Option<Arc<ObjectPool<T>>> {
        let pool = self.object_pool_entry::<T>()?;
        let typed = typed_pool::<ObjectPool<T>>(&pool);

        if typed.is_none() {
            tracing::error!(
                item_type = type_name::<T>(),
                registered = ?pool,
                "pool registered for this type is not an ObjectPool"
            );
        }

        typed
    }

    /// Returns the array pool for arrays of `T` with `length` elements, creating it if it does
    /// not exist yet.
    ///
    /// Returns `None` for a zero `length` or a zero-sized `T`, for which there is no pool, and
    /// (logging an error) if a pool of a different implementation was registered for this key.
    #[must_use]
    pub fn array_pool<T: Default + Send + 'static>(
        &self,
        length: usize,
    ) -> Option<Arc<ArrayPool<T>>> {
        if length == 0 {
            return None;
        }

        let pool = self.array_pool_entry::<T>(length)?;
        let typed = typed_pool::<ArrayPool<T>>(&pool);

        if typed.is_none() {
            tracing::error!(
                element_type = type_name::<T>(),
                length,
                registered = ?pool,
                "pool registered for this array type is not an ArrayPool"
            );
        }

        typed
    }

    /// Returns the pool registered for item type `item_type`, without creating one.
    #[must_use]
    pub fn find_object_pool(&self, item_type: TypeId) -> Option<Arc<dyn Pool>> {
        self.state().object_pool(item_type)
    }

    /// Returns the pool registered for arrays of `element_type` with `length` elements, without
    /// creating one.
    #[must_use]
    pub fn find_array_pool(&self, element_type: TypeId, length: usize) -> Option<Arc<dyn Pool>> {
        self.state().array_pool(element_type, length)
    }

    /// Registers a pre-configured object pool, e.g. one with custom hooks.
    ///
    /// Returns `false` and drops `pool` if a pool for `T` already exists.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::{ObjectPool, PoolRegistry};
    ///
    /// let registry = PoolRegistry::new();
    ///
    /// let pool = ObjectPool::<String>::builder().reset(|s| s.clear()).build();
    /// assert!(registry.add_object_pool(pool));
    ///
    /// let mut s = registry.acquire::<String>();
    /// s.push_str("used");
    /// registry.release(s);
    ///
    /// assert!(registry.acquire::<String>().is_empty());
    /// ```
    pub fn add_object_pool<T: Send + 'static>(&self, pool: ObjectPool<T>) -> bool {
        self.state()
            .insert_object_pool(TypeId::of::<T>(), Arc::new(pool))
    }

    /// Registers a pre-configured array pool under its element type and length.
    ///
    /// Returns `false` and drops `pool` if a pool for that key already exists.
    pub fn add_array_pool<T: Default + Send + 'static>(&self, pool: ArrayPool<T>) -> bool {
        let length = pool.array_length();
        let mut state = self.state();

        let added = state.insert_array_pool(TypeId::of::<T>(), length, Arc::new(pool));
        if added {
            state.register_array_route::<T>();
        }

        added
    }

    /// Registers any implementation of [`Pool`], keyed by its item type and array length.
    ///
    /// Returns `false` if a pool for that key already exists. Array pools registered this way are
    /// reachable through typed calls and sweeps; [`release_any()`][Self::release_any] routes
    /// arrays only to element types that also went through a typed array call.
    pub fn add_pool(&self, pool: Arc<dyn Pool>) -> bool {
        let item_type = pool.item_type_id();
        let mut state = self.state();

        match pool.array_length() {
            Some(length) => state.insert_array_pool(item_type, length, pool),
            None => state.insert_object_pool(item_type, pool),
        }
    }

    /// Returns the object pool registered for `T`, registering the result of `create` if there
    /// is none.
    ///
    /// If the registered pool is not a `P`, the inconsistency is logged as an error and the
    /// registered pool is returned anyway.
    pub fn check_pool<T, P, F>(&self, create: F) -> Arc<dyn Pool>
    where
        T: 'static,
        P: Pool,
        F: FnOnce() -> P,
    {
        if let Some(pool) = self.find_object_pool(TypeId::of::<T>()) {
            return Self::checked::<T, P>(pool);
        }

        let created: Arc<dyn Pool> = Arc::new(create());

        let mut state = self.state();

        if let Some(pool) = state.object_pool(TypeId::of::<T>()) {
            return Self::checked::<T, P>(pool);
        }

        tracing::debug!(
            item_type = type_name::<T>(),
            implementation = type_name::<P>(),
            "registering pool"
        );
        state.insert_object_pool(TypeId::of::<T>(), Arc::clone(&created));

        created
    }

    fn checked<T: 'static, P: Pool>(pool: Arc<dyn Pool>) -> Arc<dyn Pool> {
        if !Arc::clone(&pool).into_any().is::<P>() {
            tracing::error!(
                item_type = type_name::<T>(),
                expected = type_name::<P>(),
                registered = ?pool,
                "pool registered for this type has a different implementation"
            );
        }

        pool
    }

    /// Hands out an instance of `T` that stays checked out until released.
    ///
    /// Zero-sized types are not pooled: unless a custom pool was registered for one, each call
    /// returns a new instance and releasing it has no effect.
    #[must_use]
    pub fn acquire<T: Default + Send + 'static>(&self) -> Box<T> {
        self.acquire_leased(Lease::Unlimited)
    }

    /// Hands out an instance of `T` under the given lease.
    ///
    /// If the pool registered for `T` is a custom implementation, the instance comes from its
    /// type-erased interface and the lease does not apply. If that pool cannot provide one, a new
    /// unpooled instance is returned.
    #[must_use]
    pub fn acquire_leased<T: Default + Send + 'static>(&self, lease: Lease) -> Box<T> {
        let Some(pool) = self.object_pool_entry::<T>() else {
            return Box::default();
        };

        if let Some(typed) = typed_pool::<ObjectPool<T>>(&pool) {
            return typed.acquire_leased(lease);
        }

        pool.acquire_any()
            .and_then(|instance| instance.downcast::<T>().ok())
            .unwrap_or_else(|| {
                tracing::error!(
                    item_type = type_name::<T>(),
                    registered = ?pool,
                    "registered pool did not provide an instance, handing out an unpooled one"
                );

                Box::default()
            })
    }

    /// Hands out an array of `length` default values that stays checked out until released.
    ///
    /// A zero `length` returns an empty array that belongs to no pool. Arrays of zero-sized
    /// elements are not pooled either.
    #[must_use]
    pub fn acquire_array<T: Default + Send + 'static>(&self, length: usize) -> Box<[T]> {
        self.acquire_array_leased(length, Lease::Unlimited)
    }

    /// Hands out an array of `length` default values under the given lease.
    #[must_use]
    pub fn acquire_array_leased<T: Default + Send + 'static>(
        &self,
        length: usize,
        lease: Lease,
    ) -> Box<[T]> {
        if length == 0 {
            return Box::default();
        }

        let Some(pool) = self.array_pool_entry::<T>(length) else {
            return iter::repeat_with(T::default).take(length).collect();
        };

        if let Some(typed) = typed_pool::<ArrayPool<T>>(&pool) {
            return typed.acquire_leased(lease);
        }

        pool.acquire_any()
            .and_then(|instance| instance.downcast::<Box<[T]>>().ok())
            .map(|array| *array)
            .filter(|array| array.len() == length)
            .unwrap_or_else(|| {
                tracing::error!(
                    element_type = type_name::<T>(),
                    length,
                    registered = ?pool,
                    "registered pool did not provide an array, handing out an unpooled one"
                );

                iter::repeat_with(T::default).take(length).collect()
            })
    }

    /// Hands out an empty collection.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::VecDeque;
    ///
    /// use reuse_pool::PoolRegistry;
    ///
    /// let registry = PoolRegistry::new();
    ///
    /// let mut queue = registry.acquire_collection::<VecDeque<u32>>();
    /// queue.push_back(1);
    /// registry.release_collection(queue);
    ///
    /// assert!(registry.acquire_collection::<VecDeque<u32>>().is_empty());
    /// ```
    #[must_use]
    pub fn acquire_collection<C: Collection>(&self) -> Box<C> {
        let mut collection = self.acquire::<C>();

        // Collections released through the plain release path come back with their contents.
        collection.clear();

        collection
    }

    /// Hands out an empty `Vec<T>`.
    #[must_use]
    pub fn acquire_vec<T: Send + 'static>(&self) -> Box<Vec<T>> {
        self.acquire_collection()
    }

    /// Hands out an empty `HashSet<T>`.
    #[must_use]
    pub fn acquire_hash_set<T: Eq + Hash + Send + 'static>(&self) -> Box<StdHashSet<T>> {
        self.acquire_collection()
    }

    /// Hands out an empty `HashMap<K, V>`.
    #[must_use]
    pub fn acquire_hash_map<K, V>(&self) -> Box<StdHashMap<K, V>>
    where
        K: Eq + Hash + Send + 'static,
        V: Send + 'static,
    {
        self.acquire_collection()
    }

    /// Hands out an instance from the object pool already registered for `item_type`.
    ///
    /// Returns `None` if there is no such pool or it does not support type-erased acquisition.
    #[must_use]
    pub fn acquire_any(&self, item_type: TypeId) -> Option<Box<dyn Any + Send>> {
        self.find_object_pool(item_type)?.acquire_any()
    }

    /// Returns an instance or array to the pool it came from.
    ///
    /// Values for which no pool exists, values no pool issued and values that were already
    /// released are dropped without any other effect.
    pub fn release<R: Recyclable>(&self, value: R) {
        value.recycle(self);
    }

    pub(crate) fn release_object<T: Send + 'static>(&self, instance: Box<T>) {
        let Some(pool) = self.find_object_pool(TypeId::of::<T>()) else {
            tracing::trace!(item_type = type_name::<T>(), "no pool to release into");
            return;
        };

        match typed_pool::<ObjectPool<T>>(&pool) {
            Some(typed) => typed.release(instance),
            None => pool.release_any(instance),
        }
    }

    pub(crate) fn release_array<T: Default + Send + 'static>(&self, array: Box<[T]>) {
        if array.is_empty() {
            return;
        }

        let Some(pool) = self.find_array_pool(TypeId::of::<T>(), array.len()) else {
            tracing::trace!(
                element_type = type_name::<T>(),
                length = array.len(),
                "no pool to release into"
            );
            return;
        };

        match typed_pool::<ArrayPool<T>>(&pool) {
            Some(typed) => typed.release(array),
            None => pool.release_any(Box::new(array)),
        }
    }

    /// Empties a collection and returns it to its pool.
    pub fn release_collection<C: Collection>(&self, mut collection: Box<C>) {
        collection.clear();
        self.release_object(collection);
    }

    /// Returns a type-erased instance or array to the pool matching its runtime type.
    ///
    /// Arrays are expected in the erased form produced by [`Pool::acquire_any()`] on an array
    /// pool, a boxed `Box<[T]>`.
    pub fn release_any(&self, instance: Box<dyn Any + Send>) {
        let runtime_type = (*instance).type_id();

        let pool = {
            let state = self.state();

            state.object_pool(runtime_type).or_else(|| {
                let route = state.array_routes.get(&runtime_type)?;
                let (element_type, length) = route(&*instance)?;
                state.array_pool(element_type, length)
            })
        };

        match pool {
            Some(pool) => pool.release_any(instance),
            None => tracing::trace!("no pool to release type-erased instance into"),
        }
    }

    /// Number of checked-out instances in the object pool for `T`, zero if there is none.
    #[must_use]
    pub fn live_count<T: 'static>(&self) -> usize {
        self.find_object_pool(TypeId::of::<T>())
            .map_or(0, |pool| pool.stats().live_count())
    }

    /// Number of slots in the object pool for `T`, zero if there is none.
    #[must_use]
    pub fn total_object_count<T: 'static>(&self) -> usize {
        self.find_object_pool(TypeId::of::<T>())
            .map_or(0, |pool| pool.stats().total_object_count())
    }

    /// Number of registered pools of all kinds.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.state().all_pools.len()
    }

    /// Reclaims idle instances in every registered pool.
    ///
    /// Pools without checked-out instances are reset to their empty initial state. Intended to
    /// run periodically, e.g. once per maintenance tick.
    pub fn sweep(&self) {
        let pools = self.state().all_pools.clone();

        for pool in pools {
            pool.clear_unused();
        }
    }

    /// Snapshots the counters of every registered pool, sorted by `order`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::{PoolOrder, PoolRegistry};
    ///
    /// let registry = PoolRegistry::new();
    /// let small = registry.acquire_array::<u8>(4);
    /// let large = registry.acquire_array::<u8>(4096);
    ///
    /// let stats = registry.pool_stats(PoolOrder::LiveSize);
    /// assert_eq!(stats[0].type_name(), "u8[4096]");
    /// # registry.release(small);
    /// # registry.release(large);
    /// ```
    #[must_use]
    pub fn pool_stats(&self, order: PoolOrder) -> Vec<PoolStats> {
        let pools = self.state().all_pools.clone();

        let mut stats = pools.iter().map(|pool| pool.stats()).collect::<Vec<_>>();
        stats.sort_by(|a, b| order.compare(a, b));

        stats
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoolRegistry {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();

        f.debug_struct("PoolRegistry")
            .field("initial_capacity", &self.inner.config.initial_capacity)
            .field("tick_source", &self.inner.config.tick_source)
            .field("object_pools", &state.object_pools.len())
            .field("pools", &state.all_pools.len())
            .finish_non_exhaustive()
    }
}

/// Builder for creating an instance of [`PoolRegistry`].
///
/// The settings apply to every pool the registry creates on demand. Pools registered via
/// [`PoolRegistry::add_object_pool()`] and its siblings keep their own configuration.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use reuse_pool::PoolRegistry;
///
/// let registry = PoolRegistry::builder()
///     .initial_capacity(32)
///     .memory_snapshot(Arc::new(|| 0_u64))
///     .build();
///
/// let value = registry.acquire::<u64>();
/// registry.release(value);
/// ```
#[must_use]
pub struct PoolRegistryBuilder {
    initial_capacity: usize,
    tick_source: Option<Arc<dyn TickSource>>,
    memory_snapshot: Option<MemorySnapshot>,
}

impl PoolRegistryBuilder {
    pub(crate) fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            tick_source: None,
            memory_snapshot: None,
        }
    }

    /// Sets how many slots each created pool reserves bookkeeping space for up front.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the clock shared by all created pools.
    ///
    /// Defaults to a new [`SystemTicks`].
    pub fn tick_source(mut self, tick_source: Arc<dyn TickSource>) -> Self {
        self.tick_source = Some(tick_source);
        self
    }

    /// Sets the memory gauge that created pools use to estimate their instance size.
    pub fn memory_snapshot(mut self, snapshot: MemorySnapshot) -> Self {
        self.memory_snapshot = Some(snapshot);
        self
    }

    /// Builds the registry.
    #[must_use]
    pub fn build(self) -> PoolRegistry {
        PoolRegistry {
            inner: Arc::new(RegistryInner {
                config: RegistryConfig {
                    initial_capacity: self.initial_capacity,
                    tick_source: self
                        .tick_source
                        .unwrap_or_else(|| Arc::new(SystemTicks::new())),
                    memory_snapshot: self.memory_snapshot,
                },
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }
}

impl fmt::Debug for PoolRegistryBuilder {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistryBuilder")
            .field("initial_capacity", &self.initial_capacity)
            .field("tick_source", &self.tick_source)
            .field("has_memory_snapshot", &self.memory_snapshot.is_some())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::ManualTicks;

    assert_impl_all!(PoolRegistry: Send, Sync, Clone);

    #[test]
    fn pools_are_created_once() {
        let registry = PoolRegistry::new();

        let a = registry.object_pool::<u32>().unwrap();
        let b = registry.object_pool::<u32>().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.pool_count(), 1);
    }

    #[test]
    fn clones_share_pools() {
        let registry = PoolRegistry::new();
        let clone = registry.clone();

        let value = registry.acquire::<u64>();
        assert_eq!(clone.live_count::<u64>(), 1);

        clone.release(value);
        assert_eq!(registry.live_count::<u64>(), 0);
    }

    #[test]
    fn counters_do_not_create_pools() {
        let registry = PoolRegistry::new();

        assert_eq!(registry.live_count::<String>(), 0);
        assert_eq!(registry.total_object_count::<String>(), 0);
        assert_eq!(registry.pool_count(), 0);
    }

    #[test]
    fn release_without_pool_is_noop() {
        let registry = PoolRegistry::new();

        registry.release(Box::new(5_u16));
        registry.release(vec![1_u8, 2].into_boxed_slice());

        assert_eq!(registry.pool_count(), 0);
    }

    #[test]
    fn zero_length_arrays_are_unpooled() {
        let registry = PoolRegistry::new();

        let empty = registry.acquire_array::<u32>(0);
        assert!(empty.is_empty());
        assert!(registry.array_pool::<u32>(0).is_none());

        registry.release(empty);
        assert_eq!(registry.pool_count(), 0);
    }

    #[test]
    fn zero_sized_types_are_unpooled() {
        #[derive(Debug, Default, PartialEq)]
        struct Marker;

        let registry = PoolRegistry::new();

        let unit = registry.acquire::<()>();
        let marker = registry.acquire_leased::<Marker>(Lease::Ticks(5));
        assert_eq!(*marker, Marker);
        assert!(registry.object_pool::<()>().is_none());

        let markers = registry.acquire_array::<Marker>(3);
        assert_eq!(markers.len(), 3);
        assert!(registry.array_pool::<Marker>(3).is_none());

        registry.release(unit);
        registry.release(marker);
        registry.release(markers);
        assert_eq!(registry.pool_count(), 0);

        // Other types are unaffected.
        let name = registry.acquire::<String>();
        registry.release(name);
        assert_eq!(registry.live_count::<String>(), 0);
        assert_eq!(registry.pool_count(), 1);
    }

    #[test]
    fn created_pools_use_registry_ticks() {
        let ticks = Arc::new(ManualTicks::new(100));
        let registry = PoolRegistry::builder()
            .tick_source(Arc::<ManualTicks>::clone(&ticks))
            .build();

        let first = registry.acquire_leased::<u64>(Lease::Ticks(5));
        let first_address = &raw const *first;

        ticks.advance(6);

        // The lease measured by the registry's clock has run out, so the slot is reclaimed.
        let second = registry.acquire_leased::<u64>(Lease::Ticks(5));
        assert_eq!(registry.total_object_count::<u64>(), 1);
        assert_eq!(registry.live_count::<u64>(), 1);
        assert_ne!(&raw const *second, first_address);

        registry.release(first);
        assert_eq!(registry.live_count::<u64>(), 1);

        registry.release(second);
        assert_eq!(registry.live_count::<u64>(), 0);
    }

    #[test]
    fn created_pools_use_registry_gauge() {
        let registry = PoolRegistry::builder()
            .memory_snapshot(Arc::new(|| 0_u64))
            .build();

        let value = registry.acquire::<[u64; 8]>();

        let stats = registry.pool_stats(PoolOrder::TotalCount);
        assert_eq!(stats[0].type_size(), 0);

        registry.release(value);
    }
}
