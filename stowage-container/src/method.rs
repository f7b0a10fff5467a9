//! Post-construction method calls ("setter injection").
//!
//! Two halves meet here:
//! - [`Method`] describes one call to make: a method name and its arguments.
//! - [`ExposedMethod`] is a named, type-erased `Fn(&mut T, ..)` a
//!   definition makes callable by name, standing in for runtime reflection.

use std::any::{Any, type_name};
use std::fmt;

use crate::call::{Arguments, CallError};
use crate::service_type::ServiceType;
use crate::value::{Argument, Reference, Value};

/// One method call to apply to a freshly constructed service.
///
/// # Examples
/// ```
/// use stowage_container::method::Method;
///
/// let call = Method::new("Bar").arg(5).arg("bar_was_called");
/// assert_eq!(call.name(), "Bar");
/// assert_eq!(call.arguments().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    arguments: Vec<Argument>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Appends a literal argument.
    pub fn arg<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.arguments.push(Argument::new(value));
        self
    }

    /// Appends a reference to another service.
    pub fn reference(mut self, identifier: impl Into<String>) -> Self {
        self.arguments.push(Reference::new(identifier).into());
        self
    }

    /// Appends prepared arguments, in order.
    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

/// Erased receiver of a method call.
pub(crate) type Receiver = dyn Any + Send + Sync + 'static;

type InvokeFn = Box<dyn Fn(&mut Receiver, Vec<Value>) -> Result<(), CallError> + Send + Sync>;

/// A method a service type makes callable by name.
pub struct ExposedMethod {
    name: String,
    receiver: ServiceType,
    params: Vec<ServiceType>,
    invoke: InvokeFn,
}

impl ExposedMethod {
    /// Wraps `method` under `name`.
    pub fn new<T, Args, F>(name: impl Into<String>, method: F) -> Self
    where
        F: IntoMethod<T, Args>,
    {
        method.into_method(name.into())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type the method must be called on.
    #[inline]
    pub fn receiver(&self) -> ServiceType {
        self.receiver
    }

    /// Declared parameter types, receiver excluded.
    #[inline]
    pub fn params(&self) -> &[ServiceType] {
        &self.params
    }

    /// Declared parameter count, receiver excluded.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn invoke(
        &self,
        target: &mut Receiver,
        args: Vec<Value>,
    ) -> Result<(), CallError> {
        (self.invoke)(target, args)
    }
}

impl fmt::Debug for ExposedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposedMethod")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .field("params", &self.params)
            .finish()
    }
}

/// Conversion of a callable into an [`ExposedMethod`].
///
/// Implemented for `Fn(&mut T, A1, .., An) -> R` with `n <= 8`, which
/// covers plain `&mut self` methods such as `Foo::set_port`. The return
/// value is discarded.
pub trait IntoMethod<T, Args> {
    fn into_method(self, name: String) -> ExposedMethod;
}

macro_rules! impl_method {
    ($($ty:ident),*) => {
        impl<F, T, R, $($ty,)*> IntoMethod<T, ($($ty,)*)> for F
        where
            F: Fn(&mut T, $($ty),*) -> R + Send + Sync + 'static,
            T: Send + Sync + 'static,
            $($ty: Clone + Send + Sync + 'static,)*
        {
            fn into_method(self, name: String) -> ExposedMethod {
                let params = vec![$(ServiceType::of::<$ty>()),*];
                let arity = params.len();
                ExposedMethod {
                    name,
                    receiver: ServiceType::of::<T>(),
                    params,
                    invoke: Box::new(move |target: &mut Receiver, values: Vec<Value>| {
                        let receiver = target.downcast_mut::<T>().ok_or(CallError::Receiver {
                            expected: type_name::<T>(),
                            found: "another type",
                        })?;
                        #[allow(unused_mut, unused_variables)]
                        let mut args = Arguments::new(values, arity)?;
                        (self)(receiver, $(args.take::<$ty>()?),*);
                        Ok(())
                    }),
                }
            }
        }
    };
}

impl_method!();
impl_method!(A1);
impl_method!(A1, A2);
impl_method!(A1, A2, A3);
impl_method!(A1, A2, A3, A4);
impl_method!(A1, A2, A3, A4, A5);
impl_method!(A1, A2, A3, A4, A5, A6);
impl_method!(A1, A2, A3, A4, A5, A6, A7);
impl_method!(A1, A2, A3, A4, A5, A6, A7, A8);
