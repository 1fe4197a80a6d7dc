#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Reusable object and array pools, a type-keyed registry that creates them on demand, and
//! growable buffers whose storage is borrowed from the registry.
//!
//! Allocation-heavy code (mesh builders, parsers, per-frame scratch buffers) tends to create and
//! drop the same shapes of data over and over. This package keeps released instances around and
//! hands them out again, so steady-state operation touches the allocator rarely.
//!
//! # Features
//!
//! - **Object pools**: [`ObjectPool`] hands out `Box<T>` instances and recognizes them on release
//!   by address, with optional hooks at each point of an instance's lifecycle.
//! - **Array pools**: [`ArrayPool`] hands out fixed-length `Box<[T]>` arrays, always filled with
//!   default values.
//! - **Leases**: an instance acquired under a [`Lease::Ticks`] budget can be reclaimed by the pool
//!   once the budget runs out, even if it was never released.
//! - **Registry**: [`PoolRegistry`] creates pools lazily per type (and per length for arrays),
//!   routes released values back to their pool and sweeps idle instances on demand.
//! - **Pooled buffers**: [`PooledArray`] and [`PooledList`] grow by swapping in larger pooled
//!   arrays, sized along fixed [capacity steps][calc_capacity] so that similar buffers share pools.
//!
//! # Example
//!
//! ```rust
//! use reuse_pool::{Lease, PoolRegistry, PooledList};
//!
//! let registry = PoolRegistry::new();
//!
//! // Plain instances.
//! let mut name = registry.acquire::<String>();
//! name.push_str("atrium");
//! registry.release(name);
//!
//! // Fixed-length arrays, zero-filled on every acquire.
//! let indices = registry.acquire_array::<u32>(6);
//! assert_eq!(&*indices, &[0; 6]);
//! registry.release(indices);
//!
//! // A scratch buffer the pool may take back after 5 seconds of millisecond ticks.
//! let scratch = registry.acquire_leased::<Vec<u8>>(Lease::Ticks(5_000));
//! registry.release(scratch);
//!
//! // Growable lists backed by pooled arrays.
//! let mut floors = PooledList::new(&registry);
//! floors.push(1_u8);
//! floors.push(2);
//! assert_eq!(floors.index_of(&2), Some(1));
//!
//! // Reclaim everything that is idle.
//! drop(floors);
//! registry.sweep();
//! ```
//!
//! # Instance identity
//!
//! Pools recognize instances by the address of their heap allocation. Releasing a value the pool
//! never issued, or releasing twice, is a silent no-op. Zero-sized types and zero-length arrays
//! have no allocation of their own and cannot be pooled.

mod array_pool;
mod builder;
mod capacity;
mod collection;
mod constants;
mod entry;
mod error;
mod lease;
mod object_pool;
mod pool;
mod pooled_array;
mod pooled_list;
mod recyclable;
mod registry;
mod slots;
mod ticks;

pub use array_pool::*;
pub use builder::*;
pub use capacity::*;
pub use collection::*;
pub use constants::DEFAULT_INITIAL_CAPACITY;
pub use error::*;
pub use lease::*;
pub use object_pool::*;
pub use pool::*;
pub use pooled_array::*;
pub use pooled_list::*;
pub use recyclable::*;
pub use registry::*;
pub use slots::MemorySnapshot;
pub use ticks::*;
