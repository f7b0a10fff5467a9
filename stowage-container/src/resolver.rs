//! The resolution engine: turns a [`Definition`] into a live [`Instance`].
//!
//! # Algorithm
//! 1. A definition built from an instance yields that instance as-is.
//! 2. The constructor's arity is checked against the argument list.
//! 3. Each argument is resolved in order. References go through the
//!    [`Resolver`] (depth-first, fully built before use), literals pass
//!    through unchanged. The first failure aborts before construction.
//! 4. The constructor is invoked.
//! 5. Method calls run in declaration order on the new service, each
//!    with its own resolved arguments and arity check.
//! 6. The service is moved behind a shared [`Instance`] handle.

use tracing::{debug, instrument, trace, warn};

use crate::call::CallError;
use crate::definition::{Definition, Source};
use crate::error::{ArityMismatchError, CallTarget, Result, StowageError};
use crate::instance::Instance;
use crate::options::ContainerOptions;
use crate::value::{Argument, Value};

/// Resolves references to other services.
///
/// Separated from the container so the engine can be driven, and
/// tested, without one.
pub trait Resolver {
    /// Returns the (cached or freshly built) service under `id`.
    fn resolve_reference(&self, id: &str) -> Result<Instance>;
}

/// Builds the service described by `definition`.
///
/// # Errors
/// - [`StowageError::ArityMismatch`]: argument and parameter counts differ
/// - [`StowageError::ArgumentType`]: an argument has the wrong type
/// - [`StowageError::MethodNotFound`]: unknown method (strict mode only)
/// - [`StowageError::ConstructionFailed`]: a fallible constructor failed
/// - any error from resolving a reference
#[instrument(skip_all, fields(service_type = %definition.service_type()))]
pub fn resolve(
    definition: &Definition,
    resolver: &dyn Resolver,
    options: &ContainerOptions,
) -> Result<Instance> {
    let constructor = match definition.source() {
        Source::Instance(instance) => {
            trace!("Definition holds a pre-built instance");
            return Ok(instance.clone());
        }
        Source::Constructor(constructor) => constructor,
    };

    let arguments = definition.arguments();
    let target = CallTarget::Constructor(constructor.name());

    if arguments.len() != constructor.arity() {
        return Err(StowageError::ArityMismatch(ArityMismatchError {
            target,
            expected: constructor.arity(),
            given: arguments.len(),
        }));
    }

    let values = resolve_arguments(&arguments, resolver)?;
    let mut built = constructor
        .invoke(values)
        .map_err(|err| err.into_error(target.clone()))?;
    debug!(constructor = constructor.name(), "Constructed service");

    for call in definition.method_calls() {
        let Some(method) = definition.method(call.name()) else {
            if options.strict_method_calls {
                return Err(StowageError::MethodNotFound {
                    method: call.name().to_owned(),
                    type_name: definition.service_type().type_name(),
                });
            }
            warn!(
                method = call.name(),
                "Skipping call to a method the service does not expose"
            );
            continue;
        };

        let values = resolve_arguments(call.arguments(), resolver)?;
        method
            .invoke(&mut *built, values)
            .map_err(|err| err.into_error(CallTarget::Method(call.name().to_owned())))?;
        trace!(method = call.name(), "Applied method call");
    }

    constructor.seal(built).ok_or_else(|| {
        CallError::Failed(
            format!("Type mismatch: expected {}", constructor.output()).into(),
        )
        .into_error(target)
    })
}

/// Resolves arguments in order, stopping at the first failure.
fn resolve_arguments(arguments: &[Argument], resolver: &dyn Resolver) -> Result<Vec<Value>> {
    arguments
        .iter()
        .map(|argument| {
            argument.to_value(|reference| {
                trace!(reference = %reference, "Resolving reference argument");
                resolver
                    .resolve_reference(reference.identifier())
                    .map(|instance| instance.as_argument())
            })
        })
        .collect()
}
