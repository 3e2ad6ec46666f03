//! Pool configuration options

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{PoolError, PoolResult};

/// Capacity used in place of an unbounded limit.
pub const UNBOUNDED_CAPACITY: usize = 65_535;

/// Configuration for resource pool behavior
///
/// A limit of `None` means unbounded; internally it is clamped to
/// [`UNBOUNDED_CAPACITY`].
///
/// # Examples
///
/// ```
/// use esox_resourcepool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_max_active(16)
///     .with_max_idle(4)
///     .with_max_wait(Duration::from_secs(5));
///
/// assert_eq!(config.max_active, Some(16));
/// assert_eq!(config.max_idle, Some(4));
/// assert!(config.wait_for_idle);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfiguration {
    /// Maximum number of live objects (lent out plus idle)
    pub max_active: Option<usize>,

    /// Maximum number of idle objects kept for reuse
    pub max_idle: Option<usize>,

    /// Block when the pool is exhausted instead of failing
    pub wait_for_idle: bool,

    /// Validate objects before handing them out
    pub test_on_borrow: bool,

    /// Validate objects before recycling them
    pub test_on_return: bool,

    /// Upper bound on how long a borrow may block; `None` waits forever
    pub max_wait: Option<Duration>,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_active: Some(8),
            max_idle: Some(8),
            wait_for_idle: true,
            test_on_borrow: true,
            test_on_return: true,
            max_wait: None,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of live objects
    pub fn with_max_active(mut self, count: usize) -> Self {
        self.max_active = Some(count);
        self
    }

    /// Remove the ceiling on live objects
    pub fn with_unbounded_active(mut self) -> Self {
        self.max_active = None;
        self
    }

    /// Set the maximum number of idle objects
    pub fn with_max_idle(mut self, count: usize) -> Self {
        self.max_idle = Some(count);
        self
    }

    /// Remove the ceiling on idle objects
    pub fn with_unbounded_idle(mut self) -> Self {
        self.max_idle = None;
        self
    }

    /// Choose between blocking and failing when the pool is exhausted
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_resourcepool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_wait_for_idle(false);
    /// assert!(!config.wait_for_idle);
    /// ```
    pub fn with_wait_for_idle(mut self, wait: bool) -> Self {
        self.wait_for_idle = wait;
        self
    }

    pub fn with_test_on_borrow(mut self, enabled: bool) -> Self {
        self.test_on_borrow = enabled;
        self
    }

    pub fn with_test_on_return(mut self, enabled: bool) -> Self {
        self.test_on_return = enabled;
        self
    }

    /// Bound how long a blocking borrow may wait
    pub fn with_max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = Some(wait);
        self
    }

    /// Check the configuration for limits no pool could serve
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_active == Some(0) {
            return Err(PoolError::InvalidConfiguration(
                "max_active must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn effective_max_active(&self) -> usize {
        self.max_active.unwrap_or(UNBOUNDED_CAPACITY)
    }

    pub(crate) fn effective_max_idle(&self) -> usize {
        self.max_idle.unwrap_or(UNBOUNDED_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = PoolConfiguration::default();
        assert_eq!(config.max_active, Some(8));
        assert_eq!(config.max_idle, Some(8));
        assert!(config.wait_for_idle);
        assert!(config.test_on_borrow);
        assert!(config.test_on_return);
        assert_eq!(config.max_wait, None);
    }

    #[test]
    fn test_unbounded_limits_clamp() {
        let config = PoolConfiguration::new()
            .with_unbounded_active()
            .with_unbounded_idle();
        assert_eq!(config.effective_max_active(), UNBOUNDED_CAPACITY);
        assert_eq!(config.effective_max_idle(), UNBOUNDED_CAPACITY);
    }

    #[test]
    fn test_zero_max_active_is_rejected() {
        let config = PoolConfiguration::new().with_max_active(0);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfiguration(_))
        ));

        assert!(PoolConfiguration::new().with_max_idle(0).validate().is_ok());
    }
}
