//! Core resource pool implementation

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::factory::ResourceFactory;
use crate::health::HealthStatus;
#[cfg(feature = "metrics")]
use crate::metrics::MetricsExporter;
use crate::metrics::{MetricsTracker, PoolMetrics};
use crate::state::{Lease, ObjectId, PoolState, Released, Untracked};

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// An object lent out by an [`ObjectPool`]
///
/// Dereferences to the pooled object. Dropping the handle returns the
/// object to the pool that lent it, exactly like [`ObjectPool::return_object`]
/// but without reporting errors.
///
/// A handle can be returned only once:
///
/// ```compile_fail
/// use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
///
/// let pool = ObjectPool::new(FnFactory::new(|| 1u8), PoolConfiguration::default());
/// let obj = pool.borrow_object().unwrap();
/// pool.return_object(obj).unwrap();
/// pool.return_object(obj).unwrap();
/// ```
pub struct PooledObject<F: ResourceFactory> {
    object: Option<F::Object>,
    id: ObjectId,
    pool: Arc<PoolInner<F>>,
}

impl<F: ResourceFactory> PooledObject<F> {
    fn new(object: F::Object, id: ObjectId, pool: Arc<PoolInner<F>>) -> Self {
        Self {
            object: Some(object),
            id,
            pool,
        }
    }

    /// Identity of the object within its pool
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Destroy the object instead of returning it
    pub fn invalidate(mut self) {
        if let Some(object) = self.object.take() {
            self.pool.invalidate(self.id, object);
        }
    }
}

impl<F: ResourceFactory> Deref for PooledObject<F> {
    type Target = F::Object;

    fn deref(&self) -> &Self::Target {
        self.object.as_ref().expect("Object already released")
    }
}

impl<F: ResourceFactory> DerefMut for PooledObject<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.object.as_mut().expect("Object already released")
    }
}

impl<F: ResourceFactory> Drop for PooledObject<F> {
    fn drop(&mut self) {
        if let Some(object) = self.object.take()
            && let Err(err) = self.pool.release(self.id, object)
        {
            warn!(object_id = %self.id, error = %err, "failed to return dropped object");
        }
    }
}

impl<F> fmt::Debug for PooledObject<F>
where
    F: ResourceFactory,
    F::Object: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledObject")
            .field("id", &self.id)
            .field("object", &self.object)
            .finish()
    }
}

/// Thread-safe, bounded pool of factory-created objects
///
/// Cloning the pool is cheap and yields another handle to the same objects.
///
/// # Examples
///
/// ```
/// use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
///
/// let pool = ObjectPool::new(FnFactory::new(|| String::from("conn")), PoolConfiguration::default());
///
/// let first = pool.borrow_object().unwrap();
/// let id = first.id();
/// pool.return_object(first).unwrap();
///
/// // Most recently returned objects are reused first
/// let again = pool.borrow_object().unwrap();
/// assert_eq!(again.id(), id);
/// ```
pub struct ObjectPool<F: ResourceFactory> {
    inner: Arc<PoolInner<F>>,
}

pub(crate) struct PoolInner<F: ResourceFactory> {
    factory: F,
    config: PoolConfiguration,
    state: Mutex<PoolState<F::Object>>,
    // Wakes blocked borrowers
    available: Condvar,
    // Wakes async borrowers
    released: Notify,
    metrics: MetricsTracker,
}

impl<F: ResourceFactory> ObjectPool<F> {
    /// Create an empty pool; objects are created on demand
    pub fn new(factory: F, config: PoolConfiguration) -> Self {
        let state = PoolState::new(config.effective_max_active(), config.effective_max_idle());
        Self {
            inner: Arc::new(PoolInner {
                factory,
                config,
                state: Mutex::new(state),
                available: Condvar::new(),
                released: Notify::new(),
                metrics: MetricsTracker::default(),
            }),
        }
    }

    /// Create a pool after validating the configuration
    pub fn try_new(factory: F, config: PoolConfiguration) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self::new(factory, config))
    }

    /// Borrow an object, blocking while the pool is exhausted
    ///
    /// Idle objects are reused most-recently-returned first; otherwise a new
    /// object is created if the pool is below `max_active`. With
    /// `test_on_borrow`, objects failing validation are destroyed and the
    /// borrow continues with another one.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Exhausted`] if no object is available and
    ///   `wait_for_idle` is disabled
    /// - [`PoolError::Timeout`] if `max_wait` elapses first
    /// - [`PoolError::CreateFailed`] if the factory fails
    pub fn borrow_object(&self) -> PoolResult<PooledObject<F>> {
        let deadline = self.inner.config.max_wait.map(|wait| Instant::now() + wait);
        loop {
            let lease = self.inner.acquire_blocking(deadline)?;
            if let Some(object) = self.inner.complete(lease)? {
                return Ok(object);
            }
        }
    }

    /// Borrow an object, suspending the task while the pool is exhausted
    ///
    /// Same contract as [`borrow_object`](Self::borrow_object). Dropping the
    /// returned future cancels the borrow without leaking capacity.
    pub async fn borrow_object_async(&self) -> PoolResult<PooledObject<F>> {
        let deadline = self
            .inner
            .config
            .max_wait
            .map(|wait| tokio::time::Instant::now() + wait);
        let mut waited = false;

        loop {
            let notified = self.inner.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let lease = self.inner.state.lock().try_acquire();
            if let Some(lease) = lease {
                if let Some(object) = self.inner.complete(lease)? {
                    return Ok(object);
                }
                continue;
            }

            if !self.inner.config.wait_for_idle {
                return Err(self.inner.exhausted());
            }
            if !waited {
                waited = true;
                self.inner.record_wait();
            }

            match deadline {
                None => notified.await,
                Some(deadline) => tokio::time::timeout_at(deadline, notified)
                    .await
                    .map_err(|_| self.inner.timeout())?,
            }
        }
    }

    /// Return a borrowed object
    ///
    /// Valid objects go onto the idle stack while it has room; invalid
    /// objects (with `test_on_return`) and overflow are destroyed.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotPooledObject`] if the object was lent by another pool.
    /// The rejected handle is then dropped, which hands it back to its own
    /// pool.
    pub fn return_object(&self, mut object: PooledObject<F>) -> PoolResult<()> {
        if !Arc::ptr_eq(&self.inner, &object.pool) {
            warn!(object_id = %object.id, "rejected object lent by another pool");
            return Err(PoolError::NotPooledObject);
        }

        match object.object.take() {
            Some(value) => self.inner.release(object.id, value),
            None => Ok(()),
        }
    }

    /// Destroy a borrowed object instead of returning it
    ///
    /// Always acts on the pool that lent the object.
    pub fn invalidate_object(&self, object: PooledObject<F>) {
        object.invalidate();
    }

    /// Number of objects currently lent out
    pub fn active_count(&self) -> usize {
        self.inner.state.lock().active_len()
    }

    /// Number of idle objects ready for reuse
    pub fn idle_count(&self) -> usize {
        self.inner.state.lock().idle_len()
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.inner.config
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        let (active, idle, max_active) = self.inner.counts();
        self.inner.metrics.get_metrics(active, idle, max_active)
    }

    /// Get health status
    pub fn get_health_status(&self) -> HealthStatus {
        let (active, idle, max_active) = self.inner.counts();
        HealthStatus::new(idle, active, max_active)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }
}

impl<F: ResourceFactory> Clone for ObjectPool<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: ResourceFactory> fmt::Debug for ObjectPool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (active, idle, max_active) = self.inner.counts();
        f.debug_struct("ObjectPool")
            .field("active", &active)
            .field("idle", &idle)
            .field("max_active", &max_active)
            .finish()
    }
}

impl<F: ResourceFactory> PoolInner<F> {
    /// Take a lease, waiting on the condition variable while none is available.
    fn acquire_blocking(&self, deadline: Option<Instant>) -> PoolResult<Lease<F::Object>> {
        let mut state = self.state.lock();
        let mut waited = false;

        loop {
            if let Some(lease) = state.try_acquire() {
                return Ok(lease);
            }

            if !self.config.wait_for_idle {
                return Err(self.exhausted());
            }
            if !waited {
                waited = true;
                self.record_wait();
            }

            match deadline {
                None => self.available.wait(&mut state),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Err(self.timeout());
                    }
                    let _ = self.available.wait_until(&mut state, deadline);
                }
            }
        }
    }

    /// Turn a lease into a handle. `None` means the object failed
    /// validation and was destroyed; the caller should borrow again.
    fn complete(self: &Arc<Self>, lease: Lease<F::Object>) -> PoolResult<Option<PooledObject<F>>> {
        let (id, object) = match lease {
            Lease::Reused(entry) => {
                debug!(
                    object_id = %entry.id,
                    idle_for = ?entry.last_used.elapsed(),
                    "reusing idle object"
                );
                (entry.id, entry.object)
            }
            Lease::Reserved(id) => (id, self.create(id)?),
        };

        if self.config.test_on_borrow && !self.factory.is_valid_object(&object) {
            MetricsTracker::incr(&self.metrics.validation_failures);
            debug!(object_id = %id, "object failed validation on borrow");
            self.destroy(id, object);
            self.forget_active(id);
            return Ok(None);
        }

        MetricsTracker::incr(&self.metrics.total_borrowed);
        debug!(object_id = %id, "borrowed object");
        Ok(Some(PooledObject::new(object, id, Arc::clone(self))))
    }

    fn create(&self, id: ObjectId) -> PoolResult<F::Object> {
        match self.factory.create_object() {
            Ok(object) => {
                MetricsTracker::incr(&self.metrics.total_created);
                debug!(object_id = %id, "created object");
                Ok(object)
            }
            Err(err) => {
                warn!(object_id = %id, error = %err, "factory failed to create object");
                self.forget_active(id);
                Err(PoolError::create_failed(err))
            }
        }
    }

    fn release(&self, id: ObjectId, object: F::Object) -> PoolResult<()> {
        if !self.state.lock().contains_active(id) {
            warn!(object_id = %id, "returned object is not active");
            self.destroy(id, object);
            return Err(PoolError::NotPooledObject);
        }

        // Stays counted as active while the factory checks it
        if self.config.test_on_return && !self.factory.is_valid_object(&object) {
            MetricsTracker::incr(&self.metrics.validation_failures);
            debug!(object_id = %id, "object failed validation on return");
            self.destroy(id, object);
            self.forget_active(id);
            return Ok(());
        }

        let (released, active, idle) = {
            let mut state = self.state.lock();
            let released = state.release(id, object);
            (released, state.active_len(), state.idle_len())
        };

        match released {
            Released::Idled => {
                MetricsTracker::incr(&self.metrics.total_returned);
                debug!(object_id = %id, active, idle, "returned object to idle stack");
                self.notify_released();
                Ok(())
            }
            Released::Shed(object) => {
                debug!(object_id = %id, active, idle, "idle stack full, shedding object");
                self.destroy(id, object);
                self.forget_active(id);
                Ok(())
            }
            Released::Untracked(object) => {
                warn!(object_id = %id, "returned object is not active");
                self.destroy(id, object);
                Err(PoolError::NotPooledObject)
            }
        }
    }

    fn invalidate(&self, id: ObjectId, object: F::Object) {
        self.destroy(id, object);

        let untracked = self.state.lock().untrack(id);
        match untracked {
            Untracked::Active => {}
            Untracked::Idle(stale) => {
                warn!(object_id = %id, "invalidated object was also idle");
                self.destroy(id, stale);
            }
            Untracked::Absent => {
                debug!(object_id = %id, "invalidated object was not tracked");
            }
        }
        self.notify_released();
    }

    fn destroy(&self, id: ObjectId, object: F::Object) {
        self.factory.destroy_object(object);
        MetricsTracker::incr(&self.metrics.total_destroyed);
        debug!(object_id = %id, "destroyed object");
    }

    fn forget_active(&self, id: ObjectId) {
        self.state.lock().remove_active(id);
        self.notify_released();
    }

    fn notify_released(&self) {
        self.available.notify_one();
        self.released.notify_one();
    }

    fn record_wait(&self) {
        MetricsTracker::incr(&self.metrics.wait_events);
        debug!("waiting for an idle object");
    }

    fn exhausted(&self) -> PoolError {
        MetricsTracker::incr(&self.metrics.exhausted_events);
        debug!("pool exhausted and waiting is disabled");
        PoolError::Exhausted
    }

    fn timeout(&self) -> PoolError {
        PoolError::Timeout(self.config.max_wait.unwrap_or_default())
    }

    fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock();
        (state.active_len(), state.idle_len(), state.max_active())
    }
}

impl<F: ResourceFactory> Drop for PoolInner<F> {
    fn drop(&mut self) {
        let idle = self.state.get_mut().drain_idle();
        for entry in idle {
            self.destroy(entry.id, entry.object);
        }
    }
}
