// A poisoned lock means the process is in an unrecoverable/unsafe state and must exit (we panic).
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - continued execution \
    is not safe because we can no longer ensure that the pool bookkeeping is consistent";

/// Initial entry capacity of pools that are not given an explicit one via their builder.
///
/// Applies process-wide to every pool a [`PoolRegistry`][crate::PoolRegistry] creates on demand,
/// unless the registry itself was built with a different value.
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;
