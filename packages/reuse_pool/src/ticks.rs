use std::fmt::Debug;
use std::sync::atomic::{self, AtomicU32};
use std::time::Instant;

/// A reading of a monotonic tick counter. One tick is one millisecond for [`SystemTicks`].
///
/// Tick counters wrap around after `u32::MAX`, so two readings can only be compared through
/// [`elapsed_ticks()`], which corrects for a single wraparound.
pub type Tick = u32;

/// Number of distinct tick values before the counter wraps back to zero.
const WRAPAROUND_SPAN: i64 = 1 << 32;

/// A source of monotonic ticks used to timestamp pool entries and evaluate leases.
///
/// Pools never block on the tick source, they only compare readings against lease lengths.
pub trait TickSource: Debug + Send + Sync {
    /// Returns the current tick.
    fn now(&self) -> Tick;
}

/// Calculates how many ticks have passed between `start` and `now`.
///
/// If the counter wrapped around in between (so `now` is numerically smaller than `start`),
/// the wraparound span is added back to the difference.
///
/// # Example
///
/// ```rust
/// use reuse_pool::elapsed_ticks;
///
/// assert_eq!(elapsed_ticks(100, 150), 50);
///
/// // The counter wrapped from u32::MAX back to zero between the readings.
/// assert_eq!(elapsed_ticks(u32::MAX - 9, 5), 15);
/// ```
#[must_use]
pub fn elapsed_ticks(start: Tick, now: Tick) -> Tick {
    let mut elapsed = i64::from(now)
        .checked_sub(i64::from(start))
        .expect("difference of two u32 values always fits in i64");

    if elapsed < 0 {
        elapsed = elapsed
            .checked_add(WRAPAROUND_SPAN)
            .expect("negative difference plus wraparound span always fits in i64");
    }

    Tick::try_from(elapsed).expect("corrected difference is always in 0..2^32")
}

/// Millisecond ticks measured from the moment the source was created, wrapping at `u32::MAX`.
///
/// This is the default tick source for pools and registries.
#[derive(Debug)]
pub struct SystemTicks {
    epoch: Instant,
}

impl SystemTicks {
    /// Creates a tick source whose tick zero is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for SystemTicks {
    #[cfg_attr(test, mutants::skip)] // Real time is not observable in a deterministic way.
    fn now(&self) -> Tick {
        let millis = self.epoch.elapsed().as_millis();

        #[expect(
            clippy::cast_possible_truncation,
            reason = "tick counter intentionally wraps around, same as truncation"
        )]
        let tick = millis as Tick;

        tick
    }
}

/// A tick source that only moves when told to. Intended for tests and simulations that need
/// deterministic lease expiry.
///
/// # Example
///
/// ```rust
/// use reuse_pool::{ManualTicks, TickSource};
///
/// let ticks = ManualTicks::new(10);
/// assert_eq!(ticks.now(), 10);
///
/// ticks.advance(5);
/// assert_eq!(ticks.now(), 15);
/// ```
#[derive(Debug, Default)]
pub struct ManualTicks {
    current: AtomicU32,
}

impl ManualTicks {
    /// Creates a tick source that reports `start` until moved.
    #[must_use]
    pub fn new(start: Tick) -> Self {
        Self {
            current: AtomicU32::new(start),
        }
    }

    /// Moves the counter forward by `ticks`, wrapping around at `u32::MAX`.
    pub fn advance(&self, ticks: Tick) {
        // fetch_add on atomics wraps, which is exactly the tick counter behavior.
        self.current.fetch_add(ticks, atomic::Ordering::Relaxed);
    }

    /// Sets the counter to an exact value.
    pub fn set(&self, tick: Tick) {
        self.current.store(tick, atomic::Ordering::Relaxed);
    }
}

impl TickSource for ManualTicks {
    fn now(&self) -> Tick {
        self.current.load(atomic::Ordering::Relaxed)
    }
}
