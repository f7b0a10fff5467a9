//! Argument and reference wrappers.
//!
//! An [`Argument`] is what a definition passes to a constructor or a
//! method call: either a literal [`Value`] or a [`Reference`] naming
//! another service. The engine tells the two apart at resolution time.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::service_type::ServiceType;

/// An opaque, shareable literal.
pub type Value = Arc<dyn Any + Send + Sync>;

/// A pointer to another service, by identifier.
///
/// # Examples
/// ```
/// use stowage_container::value::{Argument, Reference};
///
/// let arg = Argument::from(Reference::new("database"));
/// assert!(arg.is_reference());
/// assert_eq!(arg.as_reference().unwrap().identifier(), "database");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    identifier: String,
}

impl Reference {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// Identifier of the referenced service.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.identifier)
    }
}

#[derive(Clone)]
enum ArgumentKind {
    Literal {
        value: Value,
        value_type: ServiceType,
    },
    Reference(Reference),
}

/// A constructor or method-call argument.
///
/// Literal arguments are matched to parameters by exact type, so
/// `Argument::new("x")` fills a `&'static str` parameter and
/// `Argument::new(String::from("x"))` fills a `String` parameter.
///
/// # Examples
/// ```
/// use stowage_container::value::Argument;
///
/// let port = Argument::new(8080u16);
/// assert!(!port.is_reference());
/// assert_eq!(port.value().unwrap().downcast_ref::<u16>(), Some(&8080));
/// ```
#[derive(Clone)]
pub struct Argument {
    kind: ArgumentKind,
}

impl Argument {
    /// Wraps a literal value.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            kind: ArgumentKind::Literal {
                value: Arc::new(value),
                value_type: ServiceType::of::<T>(),
            },
        }
    }

    /// Wraps a reference to the service registered under `identifier`.
    pub fn reference(identifier: impl Into<String>) -> Self {
        Reference::new(identifier).into()
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, ArgumentKind::Reference(_))
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match &self.kind {
            ArgumentKind::Reference(reference) => Some(reference),
            ArgumentKind::Literal { .. } => None,
        }
    }

    /// The literal value, or `None` for references.
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            ArgumentKind::Literal { value, .. } => Some(value),
            ArgumentKind::Reference(_) => None,
        }
    }

    /// Type of the literal value, or `None` for references.
    pub fn value_type(&self) -> Option<ServiceType> {
        match &self.kind {
            ArgumentKind::Literal { value_type, .. } => Some(*value_type),
            ArgumentKind::Reference(_) => None,
        }
    }

    /// The value handed to a callee; references go through `resolve`.
    pub(crate) fn to_value<E>(
        &self,
        resolve: impl FnOnce(&Reference) -> Result<Value, E>,
    ) -> Result<Value, E> {
        match &self.kind {
            ArgumentKind::Literal { value, .. } => Ok(Arc::clone(value)),
            ArgumentKind::Reference(reference) => resolve(reference),
        }
    }
}

impl From<Reference> for Argument {
    fn from(reference: Reference) -> Self {
        Self {
            kind: ArgumentKind::Reference(reference),
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ArgumentKind::Literal { value_type, .. } => f
                .debug_tuple("Argument")
                .field(&value_type.short_name())
                .finish(),
            ArgumentKind::Reference(reference) => {
                f.debug_tuple("Argument").field(reference).finish()
            }
        }
    }
}
