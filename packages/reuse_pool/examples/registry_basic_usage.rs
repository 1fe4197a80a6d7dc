//! Example demonstrating a `PoolRegistry` shared by several components, with a periodic sweep.
//!
//! Pool creation and sweeps are logged at debug level to the console.

use reuse_pool::{PoolOrder, PoolRegistry, PooledList};
use tracing_subscriber::filter::LevelFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    println!("=== PoolRegistry: Lazily Created Pools ===");

    let registry = PoolRegistry::new();

    for frame in 0..3_u8 {
        // Scratch data that lives for one frame.
        let mut vertices = registry.acquire_array::<f32>(12);
        vertices[0] = f32::from(frame);

        let mut names = registry.acquire_vec::<String>();
        names.push(format!("frame {frame}"));

        let mut triangles = PooledList::new(&registry);
        for index in 0..20_u32 {
            triangles.push(index);
        }

        println!(
            "Frame {frame}: {} names, {} triangle indices (capacity {})",
            names.len(),
            triangles.len(),
            triangles.capacity()
        );

        registry.release(vertices);
        registry.release_collection(names);
    }

    println!();
    println!("Pools by total size:");
    for stats in registry.pool_stats(PoolOrder::TotalSize) {
        println!(
            "  {:<40} {:>3} slots {:>3} live {:>6} bytes",
            stats.type_name(),
            stats.total_object_count(),
            stats.live_count(),
            stats.total_size()
        );
    }

    // Everything is idle, so the sweep returns every pool to its empty state.
    registry.sweep();

    println!();
    println!(
        "After sweep: {} pools, {} slots in total",
        registry.pool_count(),
        registry
            .pool_stats(PoolOrder::TotalCount)
            .iter()
            .map(|stats| stats.total_object_count())
            .sum::<usize>()
    );
}
