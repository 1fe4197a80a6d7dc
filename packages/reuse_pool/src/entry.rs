use crate::{Lease, Tick};

/// Identity of a pooled instance: the address of its heap allocation.
///
/// Two instances are the same key only if they are the same allocation, regardless of whether
/// their contents compare equal.
pub(crate) type Identity = usize;

/// One slot of a pool.
///
/// The pool keeps the instance while the slot is free and hands it out when the slot is claimed,
/// so `instance` is `Some` exactly when the slot is idle and still holds something to reuse.
#[derive(Debug)]
pub(crate) struct Entry<I> {
    pub(crate) instance: Option<I>,

    /// Identity of the instance most recently placed in this slot.
    pub(crate) identity: Identity,

    /// Tick at the last (re)allocation. Zero while free.
    pub(crate) creation_tick: Tick,

    pub(crate) lease: Lease,

    pub(crate) used: bool,
}

impl<I> Entry<I> {
    pub(crate) fn checked_out(identity: Identity, creation_tick: Tick, lease: Lease) -> Self {
        Self {
            instance: None,
            identity,
            creation_tick,
            lease,
            used: true,
        }
    }

    pub(crate) fn returned(instance: I, identity: Identity) -> Self {
        Self {
            instance: Some(instance),
            identity,
            creation_tick: 0,
            lease: Lease::Ticks(0),
            used: false,
        }
    }

    /// A slot is claimable on the unlimited-lease path only if nobody holds it.
    pub(crate) fn is_free(&self) -> bool {
        !self.used
    }

    /// A slot is claimable on the bounded-lease path if it is free or its lease has run out.
    pub(crate) fn is_expired(&self, elapsed: Tick) -> bool {
        !self.used || self.lease.is_exceeded_after(elapsed)
    }
}
