//! Basic usage examples for ObjectPool

use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration, PoolError};
use std::sync::atomic::{AtomicUsize, Ordering};

fn main() {
    println!("=== EsoxSolutions.ResourcePool - Basic Examples ===\n");

    // Example 1: Simple pool of buffers
    simple_pool();

    // Example 2: LIFO reuse
    lifo_reuse();

    // Example 3: Failing fast when exhausted
    fail_fast();

    // Example 4: Metrics and health
    metrics_and_health();
}

fn simple_pool() {
    println!("1. Simple Pool:");
    let pool = ObjectPool::new(
        FnFactory::new(|| Vec::<u8>::with_capacity(4096)),
        PoolConfiguration::default(),
    );

    {
        let mut buffer = pool.borrow_object().unwrap();
        buffer.extend_from_slice(b"payload");
        println!("   Borrowed buffer {} holding {} bytes", buffer.id(), buffer.len());
        // Object automatically returned when dropped
    }

    println!("   Idle after return: {}\n", pool.idle_count());
}

fn lifo_reuse() {
    println!("2. LIFO Reuse:");
    let next = AtomicUsize::new(1);
    let pool = ObjectPool::new(
        FnFactory::new(move || next.fetch_add(1, Ordering::Relaxed)),
        PoolConfiguration::default(),
    );

    let borrowed: Vec<_> = (0..3).map(|_| pool.borrow_object().unwrap()).collect();
    println!("   Borrowed: {:?}", borrowed.iter().map(|o| **o).collect::<Vec<_>>());

    for obj in borrowed {
        pool.return_object(obj).unwrap();
    }

    let reused: Vec<_> = (0..3).map(|_| pool.borrow_object().unwrap()).collect();
    println!("   Reused:   {:?}\n", reused.iter().map(|o| **o).collect::<Vec<_>>());
}

fn fail_fast() {
    println!("3. Fail Fast:");
    let config = PoolConfiguration::new()
        .with_max_active(1)
        .with_wait_for_idle(false);
    let pool = ObjectPool::new(FnFactory::new(|| "conn"), config);

    let first = pool.borrow_object();
    assert!(first.is_ok());
    println!("   First borrow: Success");

    match pool.borrow_object() {
        Err(PoolError::Exhausted) => println!("   Second borrow: Exhausted"),
        Err(e) => println!("   Second borrow: {}", e),
        Ok(_) => println!("   Second borrow: Success"),
    }

    drop(first);
    assert!(pool.borrow_object().is_ok());
    println!("   Third borrow: Success\n");
}

fn metrics_and_health() {
    println!("4. Metrics and Health:");
    let pool = ObjectPool::new(FnFactory::new(|| 0u64), PoolConfiguration::default());

    {
        let _obj1 = pool.borrow_object().unwrap();
        let _obj2 = pool.borrow_object().unwrap();

        let health = pool.get_health_status();
        println!("   Health: {}", if health.is_healthy { "Healthy" } else { "Unhealthy" });
        println!("   Utilization: {:.1}%", health.utilization * 100.0);
        println!("   Active: {}, Idle: {}", health.active_objects, health.idle_objects);
    }

    let metrics = pool.export_metrics();
    println!("\n   Metrics:");
    for (key, value) in metrics {
        println!("     {}: {}", key, value);
    }
}
