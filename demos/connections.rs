//! Custom factory, validation and concurrent borrowing

use esox_resourcepool::{ObjectPool, PoolConfiguration, ResourceFactory};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct Connection {
    id: usize,
    healthy: bool,
}

#[derive(Debug)]
struct ConnectError;

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection refused")
    }
}

impl std::error::Error for ConnectError {}

#[derive(Default)]
struct ConnectionFactory {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl ResourceFactory for ConnectionFactory {
    type Object = Connection;
    type Error = ConnectError;

    fn create_object(&self) -> Result<Connection, ConnectError> {
        let id = self.opened.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Connection { id, healthy: true })
    }

    fn is_valid_object(&self, conn: &Connection) -> bool {
        conn.healthy
    }

    fn destroy_object(&self, conn: Connection) {
        self.closed.fetch_add(1, Ordering::Relaxed);
        println!("   Closed connection {}", conn.id);
    }
}

#[tokio::main]
async fn main() {
    println!("=== EsoxSolutions.ResourcePool - Connections ===\n");

    // Example 1: Broken connections are not recycled
    validation();

    // Example 2: Threads sharing a small pool
    concurrent_threads();

    // Example 3: Async borrowing
    async_borrow().await;
}

fn validation() {
    println!("1. Validation on Return:");
    let pool = ObjectPool::new(ConnectionFactory::default(), PoolConfiguration::default());

    let mut conn = pool.borrow_object().unwrap();
    conn.healthy = false;
    pool.return_object(conn).unwrap();

    println!("   Idle after returning a broken connection: {}\n", pool.idle_count());
}

fn concurrent_threads() {
    println!("2. Concurrent Threads:");
    let config = PoolConfiguration::new().with_max_active(2).with_max_idle(2);
    let pool = ObjectPool::new(ConnectionFactory::default(), config);

    let handles: Vec<_> = (0..6)
        .map(|worker| {
            let pool = pool.clone();
            thread::spawn(move || {
                let conn = pool.borrow_object().unwrap();
                println!("   Worker {} using connection {}", worker, conn.id);
                thread::sleep(Duration::from_millis(10));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = pool.get_metrics();
    println!(
        "   Created: {}, Borrowed: {}, Waits: {}\n",
        metrics.total_created, metrics.total_borrowed, metrics.wait_events
    );
}

async fn async_borrow() {
    println!("3. Async Borrowing:");
    let config = PoolConfiguration::new()
        .with_max_active(1)
        .with_max_wait(Duration::from_millis(100));
    let pool = ObjectPool::new(ConnectionFactory::default(), config);

    let held = pool.borrow_object_async().await.unwrap();
    match pool.borrow_object_async().await {
        Ok(_) => println!("   Got connection"),
        Err(e) => println!("   Error: {}", e),
    }
    drop(held);

    let conn = pool.borrow_object_async().await.unwrap();
    println!("   Reused connection {}", conn.id);

    let mut tags = HashMap::new();
    tags.insert("service".to_string(), "demo".to_string());
    match pool.export_metrics_prometheus("connections", Some(&tags)) {
        Ok(output) => println!("\n{}", output),
        Err(e) => println!("   Export failed: {}", e),
    }
}
