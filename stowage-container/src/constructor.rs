//! Type-erased constructors.
//!
//! Any `Fn(A1, .., An) -> T` with up to eight parameters becomes a
//! [`Constructor`]: a boxed closure taking positional [`Value`]s plus the
//! metadata the resolver needs (name, output type, parameter types).
//! Each argument is matched to its parameter by exact type.

use std::any::type_name;
use std::fmt;

use crate::call::{Arguments, Built, CallError};
use crate::instance::Instance;
use crate::service_type::ServiceType;
use crate::value::Value;

type InvokeFn = Box<dyn Fn(Vec<Value>) -> Result<Built, CallError> + Send + Sync>;

/// A callable that builds one service from positional arguments.
///
/// # Examples
/// ```
/// use stowage_container::constructor::Constructor;
///
/// struct Server { port: u16 }
///
/// let ctor = Constructor::new(|port: u16| Server { port });
/// assert_eq!(ctor.arity(), 1);
/// assert_eq!(ctor.output().short_name(), "Server");
/// ```
pub struct Constructor {
    name: &'static str,
    output: ServiceType,
    params: Vec<ServiceType>,
    invoke: InvokeFn,
    seal: fn(Built) -> Option<Instance>,
}

impl Constructor {
    /// Wraps an infallible constructor.
    pub fn new<F, Args>(constructor: F) -> Self
    where
        F: IntoConstructor<Args>,
    {
        constructor.into_constructor()
    }

    /// Wraps a constructor returning `Result<T, E>`.
    ///
    /// An `Err` surfaces as [`StowageError::ConstructionFailed`](crate::error::StowageError::ConstructionFailed).
    pub fn fallible<F, Args>(constructor: F) -> Self
    where
        F: IntoFallibleConstructor<Args>,
    {
        constructor.into_fallible_constructor()
    }

    fn assemble<T: Send + Sync + 'static>(
        name: &'static str,
        params: Vec<ServiceType>,
        invoke: InvokeFn,
    ) -> Self {
        Self {
            name,
            output: ServiceType::of::<T>(),
            params,
            invoke,
            seal: Instance::from_boxed::<T>,
        }
    }

    /// Rust type name of the wrapped callable.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type of the service this constructor returns.
    #[inline]
    pub fn output(&self) -> ServiceType {
        self.output
    }

    /// Declared parameter types, in order.
    #[inline]
    pub fn params(&self) -> &[ServiceType] {
        &self.params
    }

    /// Declared parameter count.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn invoke(&self, args: Vec<Value>) -> Result<Built, CallError> {
        (self.invoke)(args)
    }

    /// Moves a built service behind a shared [`Instance`] handle.
    pub(crate) fn seal(&self, built: Built) -> Option<Instance> {
        (self.seal)(built)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("output", &self.output)
            .field("params", &self.params)
            .finish()
    }
}

/// Conversion of a callable into a [`Constructor`].
///
/// Implemented for `Fn(A1, .., An) -> T` with `n <= 8`, where every
/// parameter is `Clone + Send + Sync + 'static`. Services registered
/// elsewhere in the container arrive as `Arc<S>` parameters.
pub trait IntoConstructor<Args> {
    fn into_constructor(self) -> Constructor;
}

/// Conversion of a fallible callable into a [`Constructor`].
///
/// Implemented for `Fn(A1, .., An) -> Result<T, E>` with `n <= 8`.
pub trait IntoFallibleConstructor<Args> {
    fn into_fallible_constructor(self) -> Constructor;
}

macro_rules! impl_constructor {
    ($($ty:ident),*) => {
        impl<F, T, $($ty,)*> IntoConstructor<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> T + Send + Sync + 'static,
            T: Send + Sync + 'static,
            $($ty: Clone + Send + Sync + 'static,)*
        {
            fn into_constructor(self) -> Constructor {
                let params = vec![$(ServiceType::of::<$ty>()),*];
                let arity = params.len();
                Constructor::assemble::<T>(
                    type_name::<F>(),
                    params,
                    Box::new(move |values: Vec<Value>| {
                        #[allow(unused_mut, unused_variables)]
                        let mut args = Arguments::new(values, arity)?;
                        Ok(Box::new((self)($(args.take::<$ty>()?),*)) as Built)
                    }),
                )
            }
        }

        impl<F, T, E, $($ty,)*> IntoFallibleConstructor<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Result<T, E> + Send + Sync + 'static,
            T: Send + Sync + 'static,
            E: Into<Box<dyn std::error::Error + Send + Sync>>,
            $($ty: Clone + Send + Sync + 'static,)*
        {
            fn into_fallible_constructor(self) -> Constructor {
                let params = vec![$(ServiceType::of::<$ty>()),*];
                let arity = params.len();
                Constructor::assemble::<T>(
                    type_name::<F>(),
                    params,
                    Box::new(move |values: Vec<Value>| {
                        #[allow(unused_mut, unused_variables)]
                        let mut args = Arguments::new(values, arity)?;
                        let service = (self)($(args.take::<$ty>()?),*)
                            .map_err(|err| CallError::Failed(err.into()))?;
                        Ok(Box::new(service) as Built)
                    }),
                )
            }
        }
    };
}

impl_constructor!();
impl_constructor!(A1);
impl_constructor!(A1, A2);
impl_constructor!(A1, A2, A3);
impl_constructor!(A1, A2, A3, A4);
impl_constructor!(A1, A2, A3, A4, A5);
impl_constructor!(A1, A2, A3, A4, A5, A6);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8);
