#![allow(dead_code)]

use esox_resourcepool::{ObjectPool, PoolConfiguration, ResourceFactory};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};

pub type DestroyLog = Arc<Mutex<Vec<i64>>>;

/// Hands out 0, 1, 2, ... and treats 0 as invalid.
pub struct IntegerFactory {
    next: AtomicI64,
    destroyed: DestroyLog,
}

impl ResourceFactory for IntegerFactory {
    type Object = i64;
    type Error = Infallible;

    fn create_object(&self) -> Result<i64, Infallible> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn is_valid_object(&self, object: &i64) -> bool {
        *object != 0
    }

    fn destroy_object(&self, object: i64) {
        self.destroyed.lock().push(object);
    }
}

pub fn integer_pool(config: PoolConfiguration) -> (ObjectPool<IntegerFactory>, DestroyLog) {
    let destroyed = DestroyLog::default();
    let factory = IntegerFactory {
        next: AtomicI64::new(0),
        destroyed: Arc::clone(&destroyed),
    };
    (ObjectPool::new(factory, config), destroyed)
}

#[derive(Debug)]
pub struct Probe {
    pub id: u64,
    pub valid: bool,
}

/// Observes every create and destroy a pool performs.
#[derive(Default)]
pub struct Tracker {
    pub created: AtomicU64,
    pub destroyed: Mutex<HashSet<u64>>,
    pub double_destroy: AtomicBool,
    pub live: AtomicUsize,
    pub peak_live: AtomicUsize,
}

impl Tracker {
    pub fn destroyed_count(&self) -> usize {
        self.destroyed.lock().len()
    }
}

pub struct TrackingFactory {
    pub tracker: Arc<Tracker>,
}

impl ResourceFactory for TrackingFactory {
    type Object = Probe;
    type Error = Infallible;

    fn create_object(&self) -> Result<Probe, Infallible> {
        let id = self.tracker.created.fetch_add(1, Ordering::SeqCst);
        let live = self.tracker.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.peak_live.fetch_max(live, Ordering::SeqCst);
        Ok(Probe { id, valid: true })
    }

    fn is_valid_object(&self, probe: &Probe) -> bool {
        probe.valid
    }

    fn destroy_object(&self, probe: Probe) {
        self.tracker.live.fetch_sub(1, Ordering::SeqCst);
        if !self.tracker.destroyed.lock().insert(probe.id) {
            self.tracker.double_destroy.store(true, Ordering::SeqCst);
        }
    }
}

pub fn tracking_pool(config: PoolConfiguration) -> (ObjectPool<TrackingFactory>, Arc<Tracker>) {
    let tracker = Arc::new(Tracker::default());
    let factory = TrackingFactory {
        tracker: Arc::clone(&tracker),
    };
    (ObjectPool::new(factory, config), tracker)
}
