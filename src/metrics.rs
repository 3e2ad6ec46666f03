//! Metrics collection and export for resource pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
///
/// let pool = ObjectPool::new(FnFactory::new(|| 7u32), PoolConfiguration::default());
///
/// {
///     let _obj = pool.borrow_object().unwrap();
///     let metrics = pool.get_metrics();
///     assert_eq!(metrics.total_borrowed, 1);
///     assert_eq!(metrics.total_created, 1);
///     assert_eq!(metrics.active_objects, 1);
/// }
///
/// assert_eq!(pool.get_metrics().idle_objects, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolMetrics {
    /// Objects created through the factory
    pub total_created: usize,

    /// Objects destroyed through the factory
    pub total_destroyed: usize,

    /// Successful borrows
    pub total_borrowed: usize,

    /// Objects recycled onto the idle stack
    pub total_returned: usize,

    /// Objects currently lent out
    pub active_objects: usize,

    /// Objects currently idle
    pub idle_objects: usize,

    /// Times a borrower had to wait
    pub wait_events: usize,

    /// Borrows rejected because the pool was exhausted
    pub exhausted_events: usize,

    /// Objects rejected by the factory's health check
    pub validation_failures: usize,

    /// Live objects relative to `max_active` (0.0 to 1.0)
    pub utilization: f64,

    /// Effective live-object ceiling
    pub max_active: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("total_destroyed".to_string(), self.total_destroyed.to_string());
        metrics.insert("total_borrowed".to_string(), self.total_borrowed.to_string());
        metrics.insert("total_returned".to_string(), self.total_returned.to_string());
        metrics.insert("active_objects".to_string(), self.active_objects.to_string());
        metrics.insert("idle_objects".to_string(), self.idle_objects.to_string());
        metrics.insert("wait_events".to_string(), self.wait_events.to_string());
        metrics.insert("exhausted_events".to_string(), self.exhausted_events.to_string());
        metrics.insert("validation_failures".to_string(), self.validation_failures.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("max_active".to_string(), self.max_active.to_string());
        metrics
    }
}

#[cfg(feature = "metrics")]
pub use exporter::MetricsExporter;

#[cfg(feature = "metrics")]
mod exporter {
    use std::collections::HashMap;

    use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};

    use super::PoolMetrics;
    use crate::errors::{PoolError, PoolResult};

    /// Metrics exporter for Prometheus format
    pub struct MetricsExporter;

    impl MetricsExporter {
        /// Export metrics in Prometheus exposition format
        ///
        /// Every series carries a `pool` label plus the given tags.
        ///
        /// # Examples
        ///
        /// ```
        /// use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
        /// use std::collections::HashMap;
        ///
        /// let pool = ObjectPool::new(FnFactory::new(|| 1u8), PoolConfiguration::default());
        ///
        /// let mut tags = HashMap::new();
        /// tags.insert("service".to_string(), "api".to_string());
        ///
        /// let output = pool.export_metrics_prometheus("my_pool", Some(&tags)).unwrap();
        /// assert!(output.contains("objectpool_objects_active"));
        /// assert!(output.contains("service=\"api\""));
        /// ```
        pub fn export_prometheus(
            metrics: &PoolMetrics,
            pool_name: &str,
            tags: Option<&HashMap<String, String>>,
        ) -> PoolResult<String> {
            let mut labels = HashMap::new();
            labels.insert("pool".to_string(), pool_name.to_string());
            if let Some(tags) = tags {
                labels.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            let registry = Registry::new_custom(Some("objectpool".to_string()), Some(labels))
                .map_err(export_error)?;

            let gauges = [
                ("objects_active", "Objects currently lent out", metrics.active_objects),
                ("objects_idle", "Objects currently idle", metrics.idle_objects),
                ("objects_max_active", "Live object ceiling", metrics.max_active),
            ];
            for (name, help, value) in gauges {
                let gauge = IntGauge::new(name, help).map_err(export_error)?;
                gauge.set(value as i64);
                registry.register(Box::new(gauge)).map_err(export_error)?;
            }

            let utilization =
                Gauge::new("utilization", "Pool utilization ratio").map_err(export_error)?;
            utilization.set(metrics.utilization);
            registry.register(Box::new(utilization)).map_err(export_error)?;

            let counters = [
                ("objects_created_total", "Objects created", metrics.total_created),
                ("objects_destroyed_total", "Objects destroyed", metrics.total_destroyed),
                ("objects_borrowed_total", "Successful borrows", metrics.total_borrowed),
                ("objects_returned_total", "Objects recycled", metrics.total_returned),
                ("events_wait_total", "Borrowers that had to wait", metrics.wait_events),
                ("events_exhausted_total", "Borrows rejected on exhaustion", metrics.exhausted_events),
                ("validation_failures_total", "Validation failures", metrics.validation_failures),
            ];
            for (name, help, value) in counters {
                let counter = IntCounter::new(name, help).map_err(export_error)?;
                counter.inc_by(value as u64);
                registry.register(Box::new(counter)).map_err(export_error)?;
            }

            let mut buffer = Vec::new();
            TextEncoder::new()
                .encode(&registry.gather(), &mut buffer)
                .map_err(export_error)?;
            String::from_utf8(buffer).map_err(|err| PoolError::MetricsExport(err.to_string()))
        }
    }

    fn export_error(err: prometheus::Error) -> PoolError {
        PoolError::MetricsExport(err.to_string())
    }
}

/// Internal metrics tracker
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub total_created: AtomicUsize,
    pub total_destroyed: AtomicUsize,
    pub total_borrowed: AtomicUsize,
    pub total_returned: AtomicUsize,
    pub wait_events: AtomicUsize,
    pub exhausted_events: AtomicUsize,
    pub validation_failures: AtomicUsize,
}

impl MetricsTracker {
    pub fn incr(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, active: usize, idle: usize, max_active: usize) -> PoolMetrics {
        let utilization = if max_active > 0 {
            (active + idle) as f64 / max_active as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_destroyed: self.total_destroyed.load(Ordering::Relaxed),
            total_borrowed: self.total_borrowed.load(Ordering::Relaxed),
            total_returned: self.total_returned.load(Ordering::Relaxed),
            active_objects: active,
            idle_objects: idle,
            wait_events: self.wait_events.load(Ordering::Relaxed),
            exhausted_events: self.exhausted_events.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            utilization,
            max_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_utilization_counts_idle_objects() {
        let tracker = MetricsTracker::default();
        MetricsTracker::incr(&tracker.total_created);
        MetricsTracker::incr(&tracker.total_created);

        let metrics = tracker.get_metrics(1, 1, 4);
        assert_eq!(metrics.total_created, 2);
        assert!((metrics.utilization - 0.5).abs() < f64::EPSILON);

        let exported = metrics.export();
        assert_eq!(exported["utilization"], "0.50");
        assert_eq!(exported["max_active"], "4");
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_output_carries_counters() {
        let tracker = MetricsTracker::default();
        MetricsTracker::incr(&tracker.total_created);
        MetricsTracker::incr(&tracker.total_created);
        let metrics = tracker.get_metrics(2, 0, 8);

        let output = MetricsExporter::export_prometheus(&metrics, "p", None).unwrap();
        assert!(output.contains("# TYPE objectpool_objects_created_total counter"));
        assert!(output.contains("objectpool_objects_created_total{pool=\"p\"} 2"));
        assert!(output.contains("objectpool_objects_active{pool=\"p\"} 2"));
    }
}
