//! Shared plumbing for invoking type-erased constructors and methods.

use std::any::{Any, type_name};
use std::vec;

use crate::error::{ArgumentTypeError, ArityMismatchError, CallTarget, StowageError};
use crate::value::Value;

/// A freshly built, not yet shared service.
pub(crate) type Built = Box<dyn Any + Send + Sync>;

/// Failure inside an erased call, before the callee is known by name.
#[derive(Debug)]
pub(crate) enum CallError {
    Arity {
        expected: usize,
        given: usize,
    },
    ArgumentType {
        position: usize,
        expected: &'static str,
    },
    Receiver {
        expected: &'static str,
        found: &'static str,
    },
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl CallError {
    pub(crate) fn into_error(self, target: CallTarget) -> StowageError {
        match self {
            CallError::Arity { expected, given } => {
                StowageError::ArityMismatch(ArityMismatchError {
                    target,
                    expected,
                    given,
                })
            }
            CallError::ArgumentType { position, expected } => {
                StowageError::ArgumentType(ArgumentTypeError {
                    target,
                    position,
                    expected,
                })
            }
            CallError::Receiver { expected, found } => StowageError::TypeMismatch {
                subject: format!("Receiver of {target}"),
                expected,
                found,
            },
            CallError::Failed(source) => StowageError::ConstructionFailed { target, source },
        }
    }
}

/// Positional argument reader used by the generated call shims.
pub(crate) struct Arguments {
    values: vec::IntoIter<Value>,
    position: usize,
    arity: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Value>, arity: usize) -> Result<Self, CallError> {
        if values.len() != arity {
            return Err(CallError::Arity {
                expected: arity,
                given: values.len(),
            });
        }

        Ok(Self {
            values: values.into_iter(),
            position: 0,
            arity,
        })
    }

    /// Takes the next argument as an `A`.
    pub(crate) fn take<A: Clone + 'static>(&mut self) -> Result<A, CallError> {
        let position = self.position;
        self.position += 1;

        let value = self.values.next().ok_or(CallError::Arity {
            expected: self.arity,
            given: position,
        })?;

        value
            .downcast_ref::<A>()
            .cloned()
            .ok_or(CallError::ArgumentType {
                position,
                expected: type_name::<A>(),
            })
    }
}
