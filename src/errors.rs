//! Error types for the resource pool

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("Pool is exhausted - no object available and waiting is disabled")]
    Exhausted,

    #[error("No object became available within {0:?}")]
    Timeout(Duration),

    #[error("Object was not lent out by this pool")]
    NotPooledObject,

    #[error("Factory failed to create an object: {0}")]
    CreateFailed(#[source] Arc<dyn std::error::Error + Send + Sync>),

    #[error("Invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to export metrics: {0}")]
    MetricsExport(String),
}

impl PoolError {
    pub(crate) fn create_failed<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PoolError::CreateFailed(Arc::new(err))
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
