//! Resource factory collaborator

use std::convert::Infallible;

/// Creates, validates and destroys the objects a pool manages
///
/// The pool calls these outside its internal lock, so a slow factory only
/// delays the caller that triggered it.
///
/// # Examples
///
/// ```
/// use esox_resourcepool::ResourceFactory;
/// use std::convert::Infallible;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// struct Sessions {
///     next: AtomicU32,
/// }
///
/// impl ResourceFactory for Sessions {
///     type Object = u32;
///     type Error = Infallible;
///
///     fn create_object(&self) -> Result<u32, Infallible> {
///         Ok(self.next.fetch_add(1, Ordering::Relaxed))
///     }
///
///     fn is_valid_object(&self, session: &u32) -> bool {
///         *session != 0
///     }
/// }
/// ```
pub trait ResourceFactory: Send + Sync + 'static {
    /// Type of the pooled objects
    type Object: Send + 'static;

    /// Error returned when an object cannot be created
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct a fresh, usable object
    fn create_object(&self) -> Result<Self::Object, Self::Error>;

    /// Side-effect-free health check
    fn is_valid_object(&self, _object: &Self::Object) -> bool {
        true
    }

    /// Release the object; called at most once per object
    fn destroy_object(&self, object: Self::Object) {
        drop(object);
    }
}

/// Adapts an infallible closure into a [`ResourceFactory`]
///
/// Objects are always valid and are destroyed by dropping them.
///
/// # Examples
///
/// ```
/// use esox_resourcepool::{FnFactory, ObjectPool, PoolConfiguration};
///
/// let pool = ObjectPool::new(FnFactory::new(|| Vec::<u8>::with_capacity(1024)), PoolConfiguration::default());
/// let buffer = pool.borrow_object().unwrap();
/// assert!(buffer.capacity() >= 1024);
/// ```
pub struct FnFactory<F> {
    create: F,
}

impl<F> FnFactory<F> {
    pub fn new(create: F) -> Self {
        Self { create }
    }
}

impl<F, T> ResourceFactory for FnFactory<F>
where
    F: Fn() -> T + Send + Sync + 'static,
    T: Send + 'static,
{
    type Object = T;
    type Error = Infallible;

    fn create_object(&self) -> Result<T, Infallible> {
        Ok((self.create)())
    }
}
