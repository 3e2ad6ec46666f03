//! # EsoxSolutions.ResourcePool
//!
//! Bounded, thread-safe resource pool for Rust. Objects are created,
//! validated and destroyed by a caller-supplied [`ResourceFactory`]; the
//! pool decides when to reuse, create, wait or shed.
//!
//! ## Features
//!
//! - Total (`max_active`) and idle (`max_idle`) ceilings
//! - Most-recently-returned-first reuse of idle objects
//! - Blocking or async borrowing with optional `max_wait`
//! - Validation on borrow and on return
//! - Automatic return of objects via RAII (Drop trait)
//! - Metrics, health status and Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
//!
//! let pool = ObjectPool::new(FnFactory::new(|| Vec::<u8>::new()), PoolConfiguration::default());
//! {
//!     let mut buffer = pool.borrow_object().unwrap();
//!     buffer.extend_from_slice(b"hello");
//!     // Object automatically returned when `buffer` goes out of scope
//! }
//! assert_eq!(pool.idle_count(), 1);
//! ```

mod pool;
mod config;
mod factory;
mod state;
mod metrics;
mod health;
mod errors;

pub use pool::{ObjectPool, PooledObject};
pub use config::{PoolConfiguration, UNBOUNDED_CAPACITY};
pub use factory::{FnFactory, ResourceFactory};
pub use state::ObjectId;
pub use metrics::PoolMetrics;
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use health::HealthStatus;
pub use errors::{PoolError, PoolResult};
