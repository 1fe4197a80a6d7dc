use crate::Tick;

/// How long an acquired instance may stay checked out before the pool is allowed to take its
/// slot back without the instance being released.
///
/// # Examples
///
/// ```
/// use reuse_pool::{Lease, ObjectPool};
///
/// let pool = ObjectPool::<Vec<u8>>::new();
///
/// // Checked out until explicitly released.
/// let forever = pool.acquire();
///
/// // Slot may be reclaimed once 500 ticks have passed, even if never released.
/// let short = pool.acquire_leased(Lease::Ticks(500));
///
/// pool.release(forever);
/// pool.release(short);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Lease {
    /// The instance is checked out until it is released. This is the default.
    ///
    /// Acquiring with an unlimited lease reuses the most recently released slot first.
    #[default]
    Unlimited,

    /// The slot becomes reclaimable once this many ticks have elapsed since acquisition.
    ///
    /// Acquiring with a bounded lease scans slots from the oldest index and takes the first one
    /// that is either free or whose own lease has run out.
    Ticks(Tick),
}

impl Lease {
    /// Whether a slot leased at some point is over its budget after `elapsed` ticks.
    #[must_use]
    pub fn is_exceeded_after(self, elapsed: Tick) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Ticks(limit) => limit <= elapsed,
        }
    }
}
