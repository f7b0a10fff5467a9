//! Runtime type identity for services and arguments.
//!
//! [`ServiceType`] records the concrete Rust type a definition produces
//! (or an argument carries). It combines a [`TypeId`] with the
//! human-readable type name used in error messages.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use stowage_support::rendering::shorten_type_name;

/// The concrete type behind a type-erased service or value.
///
/// # Examples
/// ```
/// use stowage_container::service_type::ServiceType;
///
/// let ty = ServiceType::of::<String>();
/// assert_eq!(ty.type_name(), "alloc::string::String");
/// assert_eq!(ty.short_name(), "String");
/// assert!(ty.is::<String>());
/// ```
#[derive(Clone, Copy)]
pub struct ServiceType {
    type_id: TypeId,
    type_name: &'static str,
}

impl ServiceType {
    /// Returns the service type for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of this type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type name with module paths stripped.
    pub fn short_name(&self) -> String {
        shorten_type_name(self.type_name)
    }

    /// Returns `true` if this is the type `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns `true` for `()`, which carries no value and no identity.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.is::<()>()
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceType({})", self.type_name)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MyStruct;

    #[test]
    fn type_of_struct() {
        let ty = ServiceType::of::<MyStruct>();
        assert!(ty.type_name().contains("MyStruct"));
        assert_eq!(ty.short_name(), "MyStruct");
    }

    #[test]
    fn equality_same_type() {
        assert_eq!(ServiceType::of::<String>(), ServiceType::of::<String>());
    }

    #[test]
    fn inequality_different_types() {
        assert_ne!(ServiceType::of::<String>(), ServiceType::of::<i32>());
    }

    #[test]
    fn unit_detection() {
        assert!(ServiceType::of::<()>().is_unit());
        assert!(!ServiceType::of::<MyStruct>().is_unit());
    }

    #[test]
    fn type_in_hashset() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ServiceType::of::<String>());
        set.insert(ServiceType::of::<String>());
        set.insert(ServiceType::of::<i32>());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_is_full_name() {
        assert_eq!(format!("{}", ServiceType::of::<i32>()), "i32");
    }
}
