use std::fmt;
use std::ptr;
use std::sync::{Arc, Mutex};

use foldhash::{HashMap, HashMapExt};

use crate::constants::ERR_POISONED_LOCK;
use crate::entry::{Entry, Identity};
use crate::{Lease, PoolStats, Tick, TickSource, elapsed_ticks};

/// Reads a process-wide memory gauge, in bytes. Pools call it right before and right after the
/// first instance they construct and keep the difference as their approximate instance size.
pub type MemorySnapshot = Arc<dyn Fn() -> u64 + Send + Sync>;

pub(crate) type Hook<I> = Box<dyn Fn(&mut I) + Send + Sync>;
pub(crate) type Factory<I> = Box<dyn Fn() -> I + Send + Sync>;

/// A heap-allocated instance that a pool can hand out and later recognize by its address.
pub(crate) trait Reusable: Send + 'static {
    fn identity(&self) -> Identity;

    /// Bytes occupied by the heap allocation itself, not counting anything it points to.
    fn shallow_size(&self) -> u64;
}

impl<T: Send + 'static> Reusable for Box<T> {
    fn identity(&self) -> Identity {
        ptr::from_ref::<T>(self).addr()
    }

    fn shallow_size(&self) -> u64 {
        u64::try_from(size_of::<T>()).unwrap_or(u64::MAX)
    }
}

impl<T: Send + 'static> Reusable for Box<[T]> {
    fn identity(&self) -> Identity {
        self.as_ptr().addr()
    }

    fn shallow_size(&self) -> u64 {
        u64::try_from(size_of_val::<[T]>(self)).unwrap_or(u64::MAX)
    }
}

/// Lifecycle callbacks, each one optional.
pub(crate) struct Hooks<I> {
    /// Runs when a recycled instance is handed out again.
    pub(crate) reset: Option<Hook<I>>,

    /// Runs once for every freshly constructed instance.
    pub(crate) first_use: Option<Hook<I>>,

    /// Runs when an instance comes back to the pool.
    pub(crate) on_return: Option<Hook<I>>,

    /// Runs on every idle instance during a sweep.
    pub(crate) on_destroy: Option<Hook<I>>,
}

impl<I> Default for Hooks<I> {
    fn default() -> Self {
        Self {
            reset: None,
            first_use: None,
            on_return: None,
            on_destroy: None,
        }
    }
}

fn run_hook<I>(hook: Option<&Hook<I>>, instance: &mut I) {
    if let Some(hook) = hook {
        hook(instance);
    }
}

/// Everything a pool needs to construct, recycle and account for its instances. Object pools and
/// array pools are thin typed shells around this.
pub(crate) struct Slots<I> {
    state: Mutex<SlotState<I>>,
    hooks: Hooks<I>,
    factory: Factory<I>,
    tick_source: Arc<dyn TickSource>,
    memory_snapshot: Option<MemorySnapshot>,
}

struct SlotState<I> {
    /// Index-stable for the lifetime of the pool, until a sweep finds the pool fully idle.
    entries: Vec<Entry<I>>,

    /// Indexes of released slots, most recently released last. May contain stale indexes that
    /// were pushed twice or claimed through the bounded-lease scan in the meantime.
    free_indices: Vec<usize>,

    index_by_identity: HashMap<Identity, usize>,

    /// Always equal to the number of entries with `used == true`.
    live_count: usize,

    /// Measured once, around the first construction.
    type_size: Option<u64>,
}

impl<I: Reusable> Slots<I> {
    pub(crate) fn new(
        initial_capacity: usize,
        factory: Factory<I>,
        hooks: Hooks<I>,
        tick_source: Arc<dyn TickSource>,
        memory_snapshot: Option<MemorySnapshot>,
    ) -> Self {
        Self {
            state: Mutex::new(SlotState {
                entries: Vec::with_capacity(initial_capacity),
                free_indices: Vec::with_capacity(initial_capacity),
                index_by_identity: HashMap::with_capacity(initial_capacity),
                live_count: 0,
                type_size: None,
            }),
            hooks,
            factory,
            tick_source,
            memory_snapshot,
        }
    }

    pub(crate) fn acquire(&self, lease: Lease) -> I {
        let now = self.tick_source.now();

        let (mut instance, recycled) = {
            let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

            let claimed = match lease {
                Lease::Unlimited => state.pop_free_index(),
                Lease::Ticks(_) => state.find_expired_index(now),
            };

            match claimed {
                Some(index) => self.reuse_slot(&mut state, index, now, lease),
                None => (self.append_slot(&mut state, now, lease), false),
            }
        };

        // The instance is already checked out, so the hooks may call back into the pool.
        let hook = if recycled {
            self.hooks.reset.as_ref()
        } else {
            self.hooks.first_use.as_ref()
        };
        run_hook(hook, &mut instance);

        instance
    }

    /// Checks out the slot at `index`. The flag tells whether the instance is a recycled one
    /// rather than freshly constructed.
    fn reuse_slot(
        &self,
        state: &mut SlotState<I>,
        index: usize,
        now: Tick,
        lease: Lease,
    ) -> (I, bool) {
        let SlotState {
            entries,
            index_by_identity,
            live_count,
            ..
        } = state;

        let entry = entries
            .get_mut(index)
            .expect("claimed index was bounds-checked by the lookup that produced it");

        let was_used = entry.used;

        let (instance, identity, recycled) = match entry.instance.take() {
            Some(instance) => (instance, entry.identity, true),
            None => {
                // The lease ran out while a caller still holds the previous instance. That
                // instance is forgotten (releasing it later is a no-op) and the slot gets a new one.
                tracing::trace!(index, "reclaiming slot with expired lease");

                // If the previous holder dropped its instance, the address may since have been
                // handed to an instance that lives in another slot.
                if index_by_identity.get(&entry.identity) == Some(&index) {
                    index_by_identity.remove(&entry.identity);
                }

                let instance = (self.factory)();
                let identity = instance.identity();
                index_by_identity.insert(identity, index);

                (instance, identity, false)
            }
        };

        *entry = Entry::checked_out(identity, now, lease);

        if !was_used {
            *live_count = live_count
                .checked_add(1)
                .expect("live count cannot exceed entry count, which is bounded by memory");
        }

        (instance, recycled)
    }

    fn append_slot(&self, state: &mut SlotState<I>, now: Tick, lease: Lease) -> I {
        let instance = if state.type_size.is_none() {
            let (instance, size) = self.construct_measured();
            state.type_size = Some(size);
            instance
        } else {
            (self.factory)()
        };

        let identity = instance.identity();
        let index = state.entries.len();

        state.index_by_identity.insert(identity, index);
        state
            .entries
            .push(Entry::checked_out(identity, now, lease));
        state.live_count = state
            .live_count
            .checked_add(1)
            .expect("live count cannot exceed entry count, which is bounded by memory");

        instance
    }

    fn construct_measured(&self) -> (I, u64) {
        match &self.memory_snapshot {
            Some(snapshot) => {
                let before = snapshot();
                let instance = (self.factory)();
                let after = snapshot();

                (instance, after.saturating_sub(before))
            }
            None => {
                let instance = (self.factory)();
                let size = instance.shallow_size();

                (instance, size)
            }
        }
    }

    pub(crate) fn release(&self, instance: I) {
        let identity = instance.identity();
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        let SlotState {
            entries,
            free_indices,
            index_by_identity,
            live_count,
            ..
        } = &mut *state;

        let Some(&index) = index_by_identity.get(&identity) else {
            tracing::trace!("ignoring release of an instance this pool does not track");
            return;
        };

        let Some(entry) = entries.get_mut(index) else {
            return;
        };

        if !entry.used || entry.identity != identity {
            // Double release, or an identity left over from a reclaimed slot.
            return;
        }

        *live_count = live_count
            .checked_sub(1)
            .expect("a used entry exists, so the live count is at least one");

        *entry = Entry::returned(instance, identity);
        free_indices.push(index);

        if let Some(instance) = entry.instance.as_mut() {
            run_hook(self.hooks.on_return.as_ref(), instance);
        }
    }

    pub(crate) fn clear_unused(&self) {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if let Some(on_destroy) = self.hooks.on_destroy.as_ref() {
            for entry in state.entries.iter_mut().filter(|entry| entry.is_free()) {
                if let Some(instance) = entry.instance.as_mut() {
                    on_destroy(instance);
                }
            }
        }

        // Idle slots that remain after this point keep their (destroyed) instances and may be
        // handed out again later without another destroy call.
        if state.live_count == 0 && !state.entries.is_empty() {
            tracing::debug!(
                dropped = state.entries.len(),
                "pool fully idle, dropping all slots"
            );

            state.entries.clear();
            state.free_indices.clear();
            state.index_by_identity.clear();
        }
    }

    pub(crate) fn stats(&self, type_name: String) -> PoolStats {
        let state = self.state.lock().expect(ERR_POISONED_LOCK);

        PoolStats::new(
            type_name,
            state.entries.len(),
            state.live_count,
            state.type_size.unwrap_or(0),
        )
    }

    #[cfg_attr(test, mutants::skip)] // Diagnostic recount, only observable when bookkeeping is broken.
    pub(crate) fn check_live_count(&self) -> bool {
        let state = self.state.lock().expect(ERR_POISONED_LOCK);

        let used = state.entries.iter().filter(|entry| entry.used).count();
        debug_assert_eq!(used, state.live_count, "incorrect live instance count");

        used == state.live_count
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().expect(ERR_POISONED_LOCK).entries.len()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.state.lock().expect(ERR_POISONED_LOCK).live_count
    }
}

impl<I> SlotState<I> {
    /// Pops the most recently released index that still refers to a free slot, discarding stale
    /// indexes on the way.
    fn pop_free_index(&mut self) -> Option<usize> {
        while let Some(index) = self.free_indices.pop() {
            if self.entries.get(index).is_some_and(Entry::is_free) {
                return Some(index);
            }
        }

        None
    }

    /// Finds the lowest index whose slot is free or whose lease has run out as of `now`.
    fn find_expired_index(&self, now: Tick) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.is_expired(elapsed_ticks(entry.creation_tick, now)))
    }
}

impl<I> fmt::Debug for Slots<I> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().expect(ERR_POISONED_LOCK);

        f.debug_struct("Slots")
            .field("entries", &state.entries.len())
            .field("free_indices", &state.free_indices.len())
            .field("live_count", &state.live_count)
            .field("type_size", &state.type_size)
            .field("tick_source", &self.tick_source)
            .finish_non_exhaustive()
    }
}
