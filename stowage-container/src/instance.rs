//! Live service handles.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::service_type::ServiceType;
use crate::value::Value;

/// A handle to a constructed service.
///
/// Cloning is cheap and every clone points at the same service.
/// The service itself is held as an `Arc<T>`, so [`Instance::downcast`]
/// hands out pointers to the one shared allocation, and the same
/// handle can fill an `Arc<T>` constructor parameter directly.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use stowage_container::instance::Instance;
///
/// let config = Arc::new(String::from("debug"));
/// let instance = Instance::new(config.clone());
///
/// let back: Arc<String> = instance.downcast().unwrap();
/// assert!(Arc::ptr_eq(&back, &config));
/// ```
#[derive(Clone)]
pub struct Instance {
    // Holds an `Arc<T>` where `T` is `service_type`.
    shared: Value,
    service_type: ServiceType,
}

impl Instance {
    /// Wraps an already shared service.
    pub fn new<T: Send + Sync + 'static>(service: Arc<T>) -> Self {
        Self {
            shared: Arc::new(service),
            service_type: ServiceType::of::<T>(),
        }
    }

    /// The concrete type of the service.
    #[inline]
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Returns `true` if the service is a `T`.
    #[inline]
    pub fn is<T: Send + Sync + 'static>(&self) -> bool {
        self.service_type.is::<T>()
    }

    /// Returns the service as an `Arc<T>`, or `None` if it is not a `T`.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.shared.downcast_ref::<Arc<T>>().cloned()
    }

    /// Returns `true` if both handles point at the same service.
    #[inline]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// The value passed when this service fills a constructor or method
    /// parameter (an `Arc<T>`).
    pub(crate) fn as_argument(&self) -> Value {
        Arc::clone(&self.shared)
    }

    pub(crate) fn from_boxed<T: Send + Sync + 'static>(
        boxed: Box<dyn Any + Send + Sync>,
    ) -> Option<Self> {
        boxed
            .downcast::<T>()
            .ok()
            .map(|service| Self::new(Arc::<T>::from(service)))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("service_type", &self.service_type.short_name())
            .finish()
    }
}
