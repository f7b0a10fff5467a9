//! Service definitions: the construction recipe for one service.
//!
//! A [`Definition`] wraps a [`Source`] (a constructor, or an instance
//! built ahead of time) together with the positional constructor
//! arguments and the method calls to apply after construction.
//!
//! The source and type are fixed at creation. The argument and
//! method-call lists are append-only and meant to be filled in before
//! the first resolution.
//!
//! # Examples
//! ```rust
//! use stowage_container::prelude::*;
//!
//! struct Foo { number: i32, text: String }
//!
//! impl Foo {
//!     fn new(number: i32, text: String) -> Self { Foo { number, text } }
//!     fn rename(&mut self, text: String) { self.text = text; }
//! }
//!
//! let definition = Definition::new(Source::constructor(Foo::new)).unwrap();
//! definition
//!     .add_arguments([Argument::new(100), Argument::new(String::from("x"))])
//!     .add_method_call(Method::new("rename").arg(String::from("y")));
//! definition.with_method("rename", Foo::rename).unwrap();
//!
//! assert!(definition.service_type().is::<Foo>());
//! assert_eq!(definition.arguments().len(), 2);
//! assert_eq!(definition.method_calls().len(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::warn;

use crate::constructor::{Constructor, IntoConstructor, IntoFallibleConstructor};
use crate::error::{MalformedSourceError, Result, StowageError};
use crate::instance::Instance;
use crate::method::{ExposedMethod, IntoMethod, Method};
use crate::service_type::ServiceType;
use crate::value::Argument;

/// Where a definition's service comes from.
#[derive(Debug)]
pub enum Source {
    /// Built on first resolution by calling the constructor.
    Constructor(Constructor),
    /// Already built; handed out as-is.
    Instance(Instance),
}

impl Source {
    /// A constructor `Fn(A1, .., An) -> T`.
    pub fn constructor<F, Args>(constructor: F) -> Self
    where
        F: IntoConstructor<Args>,
    {
        Source::Constructor(Constructor::new(constructor))
    }

    /// A fallible constructor `Fn(A1, .., An) -> Result<T, E>`.
    pub fn try_constructor<F, Args>(constructor: F) -> Self
    where
        F: IntoFallibleConstructor<Args>,
    {
        Source::Constructor(Constructor::fallible(constructor))
    }

    /// An instance the container takes ownership of.
    pub fn instance<T: Send + Sync + 'static>(service: T) -> Self {
        Source::Instance(Instance::new(Arc::new(service)))
    }

    /// An instance shared with the caller.
    pub fn shared<T: Send + Sync + 'static>(service: Arc<T>) -> Self {
        Source::Instance(Instance::new(service))
    }

    /// Type of the service this source produces.
    pub fn service_type(&self) -> ServiceType {
        match self {
            Source::Constructor(constructor) => constructor.output(),
            Source::Instance(instance) => instance.service_type(),
        }
    }
}

impl From<Constructor> for Source {
    fn from(constructor: Constructor) -> Self {
        Source::Constructor(constructor)
    }
}

impl From<Instance> for Source {
    fn from(instance: Instance) -> Self {
        Source::Instance(instance)
    }
}

/// The construction recipe for one service.
pub struct Definition {
    source: Source,
    arguments: RwLock<Vec<Argument>>,
    method_calls: RwLock<Vec<Method>>,
    methods: RwLock<HashMap<String, Arc<ExposedMethod>>>,
    resolved: AtomicBool,
}

impl Definition {
    /// Creates a definition with empty argument and method-call lists.
    ///
    /// # Errors
    /// Returns [`StowageError::MalformedSource`] for a constructor
    /// returning `()` or a `()` instance.
    pub fn new(source: impl Into<Source>) -> Result<Self> {
        let source = source.into();

        if source.service_type().is_unit() {
            let reason = match source {
                Source::Constructor(_) => "constructor returns no value",
                Source::Instance(_) => "instance has no identity",
            };
            return Err(StowageError::MalformedSource(MalformedSourceError {
                type_name: source.service_type().type_name(),
                reason,
            }));
        }

        Ok(Self {
            source,
            arguments: RwLock::new(Vec::new()),
            method_calls: RwLock::new(Vec::new()),
            methods: RwLock::new(HashMap::new()),
            resolved: AtomicBool::new(false),
        })
    }

    /// Concrete type of the service this definition produces.
    #[inline]
    pub fn service_type(&self) -> ServiceType {
        self.source.service_type()
    }

    #[inline]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The constructor, or `None` for a pre-built instance.
    pub fn constructor(&self) -> Option<&Constructor> {
        match &self.source {
            Source::Constructor(constructor) => Some(constructor),
            Source::Instance(_) => None,
        }
    }

    /// The pre-built instance, or `None` for a constructor.
    pub fn instance(&self) -> Option<&Instance> {
        match &self.source {
            Source::Instance(instance) => Some(instance),
            Source::Constructor(_) => None,
        }
    }

    /// Appends constructor arguments, in order.
    ///
    /// Nothing is checked against the constructor's parameters until
    /// resolution.
    pub fn add_arguments(&self, arguments: impl IntoIterator<Item = Argument>) -> &Self {
        self.warn_if_resolved("add_arguments");
        self.arguments.write().extend(arguments);
        self
    }

    /// Appends one constructor argument.
    pub fn add_argument(&self, argument: impl Into<Argument>) -> &Self {
        self.add_arguments([argument.into()])
    }

    /// Appends a method call to apply after construction.
    pub fn add_method_call(&self, method: Method) -> &Self {
        self.warn_if_resolved("add_method_call");
        self.method_calls.write().push(method);
        self
    }

    /// Makes `method` callable by name from method calls.
    ///
    /// # Errors
    /// Returns [`StowageError::TypeMismatch`] if the method's receiver
    /// is not this definition's service type.
    pub fn with_method<T, Args, F>(&self, name: impl Into<String>, method: F) -> Result<&Self>
    where
        F: IntoMethod<T, Args>,
    {
        let exposed = ExposedMethod::new(name, method);

        if exposed.receiver() != self.service_type() {
            return Err(StowageError::TypeMismatch {
                subject: format!("Receiver of method \"{}\"", exposed.name()),
                expected: self.service_type().type_name(),
                found: exposed.receiver().type_name(),
            });
        }

        self.methods
            .write()
            .insert(exposed.name().to_owned(), Arc::new(exposed));
        Ok(self)
    }

    /// Snapshot of the constructor arguments.
    pub fn arguments(&self) -> Vec<Argument> {
        self.arguments.read().clone()
    }

    /// Snapshot of the method calls, in application order.
    pub fn method_calls(&self) -> Vec<Method> {
        self.method_calls.read().clone()
    }

    /// Looks up an exposed method by exact name.
    pub fn method(&self, name: &str) -> Option<Arc<ExposedMethod>> {
        self.methods.read().get(name).cloned()
    }

    /// Identifiers referenced by constructor arguments and method calls.
    pub fn references(&self) -> Vec<String> {
        let arguments = self.arguments.read();
        let method_calls = self.method_calls.read();

        arguments
            .iter()
            .chain(method_calls.iter().flat_map(|call| call.arguments()))
            .filter_map(Argument::as_reference)
            .map(|reference| reference.identifier().to_owned())
            .collect()
    }

    /// Returns `true` once a service has been resolved from this definition.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    pub(crate) fn mark_resolved(&self) {
        self.resolved.store(true, Ordering::Release);
    }

    fn warn_if_resolved(&self, operation: &str) {
        if self.is_resolved() {
            warn!(
                service_type = %self.service_type(),
                operation,
                "Definition changed after resolution; the cached instance is not rebuilt"
            );
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.source {
            Source::Constructor(_) => "constructor",
            Source::Instance(_) => "instance",
        };
        f.debug_struct("Definition")
            .field("service_type", &self.service_type().short_name())
            .field("source", &kind)
            .field("arguments", &self.arguments.read().len())
            .field("method_calls", &self.method_calls.read().len())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
