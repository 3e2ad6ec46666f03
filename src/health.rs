//! Health snapshot for resource pools

/// Health status of a resource pool
///
/// # Examples
///
/// ```
/// use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
///
/// let pool = ObjectPool::new(FnFactory::new(|| 0u64), PoolConfiguration::default());
///
/// let health = pool.get_health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.idle_objects, 0);
/// assert_eq!(health.max_active, 8);
/// ```
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Live objects relative to `max_active` (0.0 to 1.0)
    pub utilization: f64,

    /// Number of idle objects ready to borrow
    pub idle_objects: usize,

    /// Number of objects currently lent out
    pub active_objects: usize,

    /// Configured ceiling on live objects
    pub max_active: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    pub fn new(idle: usize, active: usize, max_active: usize) -> Self {
        let utilization = if max_active > 0 {
            (active + idle) as f64 / max_active as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        let lent_out = if max_active > 0 {
            active as f64 / max_active as f64
        } else {
            0.0
        };
        if lent_out > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", lent_out * 100.0));
            is_healthy = false;
        }

        // Borrowers would have to wait
        if idle == 0 && active >= max_active {
            warnings.push("Pool is exhausted".to_string());
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            utilization,
            idle_objects: idle,
            active_objects: active,
            max_active,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}
