// EsoxSolutions.ResourcePool - Rust Port
// Bounded, thread-safe resource pool with factory-driven lifecycle

// This is just a binary wrapper - the actual library is in lib.rs
// Run examples with: cargo run --example basic

use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== EsoxSolutions.ResourcePool ===");
    println!("See demos/ directory for usage examples");
    println!("Run: cargo run --example basic");
    println!("Set RUST_LOG=esox_resourcepool=debug to trace the pool lifecycle");
    println!();

    println!("Quick Demo:");
    let next = AtomicU32::new(1);
    let pool = ObjectPool::new(
        FnFactory::new(move || next.fetch_add(1, Ordering::Relaxed)),
        PoolConfiguration::default(),
    );

    match pool.borrow_object() {
        Ok(obj) => {
            println!("  Borrowed object {} ({})", *obj, obj.id());
            if let Err(err) = pool.return_object(obj) {
                println!("  Return failed: {err}");
            }
        }
        Err(err) => println!("  Borrow failed: {err}"),
    }

    println!("  Idle after return: {}", pool.idle_count());
}
