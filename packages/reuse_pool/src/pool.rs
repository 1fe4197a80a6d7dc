use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

/// The type-erased face of a pool, as seen by a [`PoolRegistry`][crate::PoolRegistry].
///
/// The registry stores every pool behind this trait so it can sweep and inspect pools of
/// unrelated item types side by side, and so it can route an untyped release to the right pool.
/// [`ObjectPool`][crate::ObjectPool] and [`ArrayPool`][crate::ArrayPool] implement it; custom pool
/// implementations can be registered via [`PoolRegistry::add_pool()`][crate::PoolRegistry::add_pool].
pub trait Pool: Any + Debug + Send + Sync {
    /// The [`TypeId`] of the instances this pool hands out. For array pools this is the element
    /// type, with the array length being a separate part of the pool's key.
    fn item_type_id(&self) -> TypeId;

    /// Human-readable name of the instances this pool hands out.
    fn item_type_name(&self) -> String;

    /// The array length served by this pool, or `None` if this is not an array pool.
    fn array_length(&self) -> Option<usize> {
        None
    }

    /// Hands out an instance, if this pool supports type-erased acquisition.
    fn acquire_any(&self) -> Option<Box<dyn Any + Send>>;

    /// Takes back a type-erased instance.
    ///
    /// Instances of the wrong type, instances this pool never issued and instances that were
    /// already released are silently dropped.
    fn release_any(&self, instance: Box<dyn Any + Send>);

    /// Runs the destroy hook on idle instances and drops all bookkeeping if nothing is live.
    fn clear_unused(&self);

    /// A snapshot of the pool's counters.
    fn stats(&self) -> PoolStats;

    /// Upcasts a shared pool handle so it can be downcast to its concrete type.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Counters of one pool at a point in time.
///
/// Sizes are approximate: they multiply the size measured around the pool's first construction
/// by the relevant instance count.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolStats {
    type_name: String,
    total_object_count: usize,
    live_count: usize,
    type_size: u64,
}

impl PoolStats {
    /// Creates a snapshot from raw counters.
    #[must_use]
    pub fn new(
        type_name: String,
        total_object_count: usize,
        live_count: usize,
        type_size: u64,
    ) -> Self {
        Self {
            type_name,
            total_object_count,
            live_count,
            type_size,
        }
    }

    /// Name of the pooled item type, including the length for array pools.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Number of slots in the pool, idle or checked out.
    #[must_use]
    pub fn total_object_count(&self) -> usize {
        self.total_object_count
    }

    /// Number of instances currently checked out.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Approximate size of one instance, in bytes. Zero until the first instance is constructed.
    #[must_use]
    pub fn type_size(&self) -> u64 {
        self.type_size
    }

    /// Approximate size of all slots, in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.type_size.saturating_mul(count_as_u64(self.total_object_count))
    }

    /// Approximate size of the checked-out instances, in bytes.
    #[must_use]
    pub fn live_size(&self) -> u64 {
        self.type_size.saturating_mul(count_as_u64(self.live_count))
    }
}

fn count_as_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Orderings offered for pool introspection. Each sorts the largest pool first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PoolOrder {
    /// By [`PoolStats::total_object_count()`].
    TotalCount,

    /// By [`PoolStats::live_count()`].
    LiveCount,

    /// By [`PoolStats::total_size()`].
    TotalSize,

    /// By [`PoolStats::live_size()`].
    LiveSize,
}

impl PoolOrder {
    /// Compares two snapshots so that sorting with this comparator puts the largest first.
    #[must_use]
    pub fn compare(self, a: &PoolStats, b: &PoolStats) -> Ordering {
        match self {
            Self::TotalCount => b.total_object_count().cmp(&a.total_object_count()),
            Self::LiveCount => b.live_count().cmp(&a.live_count()),
            Self::TotalSize => b.total_size().cmp(&a.total_size()),
            Self::LiveSize => b.live_size().cmp(&a.live_size()),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn stats(total: usize, live: usize, size: u64) -> PoolStats {
        PoolStats::new("item".to_string(), total, live, size)
    }

    #[test]
    fn sizes_scale_with_counts() {
        let s = stats(10, 3, 16);

        assert_eq!(s.total_size(), 160);
        assert_eq!(s.live_size(), 48);
    }

    #[test]
    fn sizes_saturate() {
        let s = stats(usize::MAX, usize::MAX, u64::MAX);

        assert_eq!(s.total_size(), u64::MAX);
    }

    #[test]
    fn orders_put_largest_first() {
        let small_many = stats(100, 1, 1);
        let big_few = stats(2, 2, 1_000);

        let mut all = vec![small_many.clone(), big_few.clone()];

        all.sort_by(|a, b| PoolOrder::TotalCount.compare(a, b));
        assert_eq!(all, vec![small_many.clone(), big_few.clone()]);

        all.sort_by(|a, b| PoolOrder::TotalSize.compare(a, b));
        assert_eq!(all, vec![big_few.clone(), small_many.clone()]);

        all.sort_by(|a, b| PoolOrder::LiveCount.compare(a, b));
        assert_eq!(all, vec![big_few.clone(), small_many.clone()]);

        all.sort_by(|a, b| PoolOrder::LiveSize.compare(a, b));
        assert_eq!(all, vec![big_few, small_many]);
    }
}
