//! Example demonstrating lease-based reclamation of instances that were never released.

use std::sync::Arc;

use reuse_pool::{Lease, ManualTicks, ObjectPool};

fn main() {
    println!("=== ObjectPool: Leases ===");

    let ticks = Arc::new(ManualTicks::new(0));

    let pool = ObjectPool::<Vec<u8>>::builder()
        .tick_source(Arc::<ManualTicks>::clone(&ticks))
        .reset(Vec::clear)
        .build();

    // A careless caller that never releases its buffer.
    let forgotten = pool.acquire_leased(Lease::Ticks(100));
    println!(
        "Checked out with a 100 tick lease: {} slot(s), {} live",
        pool.len(),
        pool.live_count()
    );

    ticks.advance(50);
    let early = pool.acquire_leased(Lease::Ticks(100));
    println!(
        "After 50 ticks the lease still holds: {} slot(s), {} live",
        pool.len(),
        pool.live_count()
    );

    ticks.advance(100);
    let late = pool.acquire_leased(Lease::Ticks(100));
    println!(
        "After 150 ticks the first slot was reclaimed: {} slot(s), {} live",
        pool.len(),
        pool.live_count()
    );

    // The pool no longer tracks the forgotten buffer, so releasing it has no effect.
    pool.release(forgotten);
    pool.release(early);
    pool.release(late);

    println!("All released: {} live", pool.live_count());
}
