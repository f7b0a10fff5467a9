//! Error types for Stowage container operations.
//!
//! Every failure is returned to the immediate caller. Nothing is
//! retried and nothing is downgraded to a default value.

use std::fmt;

use stowage_support::rendering::{render_chain, shorten_type_name};

/// Main error type for all Stowage operations.
#[derive(Debug, thiserror::Error)]
pub enum StowageError {
    /// Registration input is neither a usable constructor nor a usable instance.
    #[error("{}", .0)]
    MalformedSource(MalformedSourceError),

    /// A definition already exists under the identifier.
    #[error("Definition for \"{id}\" already exists")]
    DefinitionConflict { id: String },

    /// No cached instance and no definition for the identifier.
    #[error("{}", .0)]
    ServiceNotFound(ServiceNotFoundError),

    /// Argument count does not match a constructor's or method's parameters.
    #[error("{}", .0)]
    ArityMismatch(ArityMismatchError),

    /// `set` was called with an instance that cannot be a service.
    #[error("Could not create definition for \"{id}\": {reason}")]
    ServiceInvalid { id: String, reason: String },

    /// Resolving a service led back to a service still being resolved.
    #[error("{}", .0)]
    CyclicReference(CyclicReferenceError),

    /// A method call names a method the service type does not expose.
    ///
    /// Only raised when `strict_method_calls` is enabled.
    #[error("Method \"{method}\" is not exposed by {}", shorten_type_name(.type_name))]
    MethodNotFound {
        method: String,
        type_name: &'static str,
    },

    /// An argument value does not have the parameter's type.
    #[error("{}", .0)]
    ArgumentType(ArgumentTypeError),

    /// A fallible constructor returned an error.
    #[error("Failed to construct via {target}: {source}")]
    ConstructionFailed {
        target: CallTarget,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A service or method does not have the requested type.
    #[error("{subject} is {}, not {}", shorten_type_name(.found), shorten_type_name(.expected))]
    TypeMismatch {
        subject: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl StowageError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StowageError::MalformedSource(_) => ErrorKind::MalformedSource,
            StowageError::DefinitionConflict { .. } => ErrorKind::DefinitionConflict,
            StowageError::ServiceNotFound(_) => ErrorKind::ServiceNotFound,
            StowageError::ArityMismatch(_) => ErrorKind::ArityMismatch,
            StowageError::ServiceInvalid { .. } => ErrorKind::ServiceInvalid,
            StowageError::CyclicReference(_) => ErrorKind::CyclicReference,
            StowageError::MethodNotFound { .. } => ErrorKind::MethodNotFound,
            StowageError::ArgumentType(_) => ErrorKind::ArgumentType,
            StowageError::ConstructionFailed { .. } => ErrorKind::ConstructionFailed,
            StowageError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }

    /// Returns the stable numeric code of this error.
    #[inline]
    pub fn code(&self) -> i32 {
        self.kind().code()
    }
}

/// Error classification with stable numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DefinitionConflict,
    ServiceNotFound,
    MalformedSource,
    ArityMismatch,
    ServiceInvalid,
    CyclicReference,
    MethodNotFound,
    ArgumentType,
    ConstructionFailed,
    TypeMismatch,
}

impl ErrorKind {
    /// Numeric code, stable across releases.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::DefinitionConflict => -1,
            ErrorKind::ServiceNotFound => -2,
            ErrorKind::MalformedSource => -3,
            ErrorKind::ArityMismatch => -4,
            ErrorKind::ServiceInvalid => -5,
            ErrorKind::CyclicReference => -6,
            ErrorKind::MethodNotFound => -7,
            ErrorKind::ArgumentType => -8,
            ErrorKind::ConstructionFailed => -9,
            ErrorKind::TypeMismatch => -10,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The callable an invocation error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// A constructor, named by the Rust type name of the callable.
    Constructor(&'static str),
    /// A named method exposed by a service type.
    Method(String),
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallTarget::Constructor(name) => write!(f, "Constructor \"{name}\""),
            CallTarget::Method(name) => write!(f, "Method \"{name}\""),
        }
    }
}

/// Error when a definition source cannot produce a service.
#[derive(Debug)]
pub struct MalformedSourceError {
    /// Type the source would have produced.
    pub type_name: &'static str,
    pub reason: &'static str,
}

impl fmt::Display for MalformedSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Malformed definition source ({}): {}",
            self.type_name, self.reason
        )?;
        write!(
            f,
            "\n  Hint: register a constructor returning a value, or a non-unit instance"
        )
    }
}

/// Error when no service exists for an identifier.
#[derive(Debug)]
pub struct ServiceNotFoundError {
    /// The identifier as originally requested.
    pub requested: String,
    /// The service whose definition referenced it (if any).
    pub required_by: Option<String>,
    /// Registered identifiers that look similar.
    pub suggestions: Vec<String>,
}

impl fmt::Display for ServiceNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No service \"{}\" was found", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: \"{parent}\"")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Error when the argument count does not match the parameter count.
#[derive(Debug)]
pub struct ArityMismatchError {
    pub target: CallTarget,
    /// Declared parameter count.
    pub expected: usize,
    /// Number of arguments supplied.
    pub given: usize,
}

impl fmt::Display for ArityMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.expected == 1 { "argument" } else { "arguments" };
        write!(
            f,
            "{} expects {} {noun}, got {}",
            self.target, self.expected, self.given
        )
    }
}

/// Error when resolving services forms a cycle.
///
/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CyclicReferenceError {
    /// Identifiers forming the cycle, first and last equal.
    /// Example: ["a", "b", "a"]
    pub chain: Vec<String>,
}

impl fmt::Display for CyclicReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cyclic reference detected:\n  {}",
            render_chain(&self.chain)
        )?;
        write!(
            f,
            "\n  Hint: inject one side through a method call on a pre-built instance, or restructure the services"
        )
    }
}

/// Error when an argument has the wrong type for its parameter.
#[derive(Debug)]
pub struct ArgumentTypeError {
    pub target: CallTarget,
    /// Zero-based parameter position.
    pub position: usize,
    pub expected: &'static str,
}

impl fmt::Display for ArgumentTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Argument #{} of {} must be {}",
            self.position + 1,
            self.target,
            shorten_type_name(self.expected)
        )
    }
}

/// Convenient Result type for Stowage operations.
pub type Result<T> = std::result::Result<T, StowageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_not_found_display() {
        let err = StowageError::ServiceNotFound(ServiceNotFoundError {
            requested: "mailer".into(),
            required_by: Some("newsletter".into()),
            suggestions: vec!["mail_transport".into()],
        });

        let msg = format!("{err}");
        assert!(msg.starts_with("No service \"mailer\" was found"));
        assert!(msg.contains("Required by: \"newsletter\""));
        assert!(msg.contains("- mail_transport"));
    }

    #[test]
    fn conflict_display() {
        let err = StowageError::DefinitionConflict { id: "foo".into() };
        assert_eq!(err.to_string(), "Definition for \"foo\" already exists");
    }

    #[test]
    fn method_arity_display() {
        let err = StowageError::ArityMismatch(ArityMismatchError {
            target: CallTarget::Method("Bar".into()),
            expected: 2,
            given: 0,
        });
        assert_eq!(err.to_string(), "Method \"Bar\" expects 2 arguments, got 0");
    }

    #[test]
    fn single_argument_is_singular() {
        let err = ArityMismatchError {
            target: CallTarget::Constructor("app::Foo::new"),
            expected: 1,
            given: 3,
        };
        assert_eq!(
            err.to_string(),
            "Constructor \"app::Foo::new\" expects 1 argument, got 3"
        );
    }

    #[test]
    fn cyclic_reference_display() {
        let err = StowageError::CyclicReference(CyclicReferenceError {
            chain: vec!["a".into(), "b".into(), "a".into()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("Cyclic"));
        assert!(msg.contains("a → b → a"));
    }

    #[test]
    fn argument_type_display_is_one_based() {
        let err = ArgumentTypeError {
            target: CallTarget::Method("set_port".into()),
            position: 0,
            expected: "u16",
        };
        assert_eq!(
            err.to_string(),
            "Argument #1 of Method \"set_port\" must be u16"
        );
    }

    #[test]
    fn type_mismatch_uses_short_names() {
        let err = StowageError::TypeMismatch {
            subject: "Service \"foo\"".into(),
            expected: "alloc::string::String",
            found: "i32",
        };
        assert_eq!(err.to_string(), "Service \"foo\" is i32, not String");
    }

    #[test]
    fn error_codes_are_stable() {
        let conflict = StowageError::DefinitionConflict { id: "x".into() };
        assert_eq!(conflict.kind(), ErrorKind::DefinitionConflict);
        assert_eq!(conflict.code(), -1);
        assert_eq!(ErrorKind::ServiceNotFound.code(), -2);
        assert_eq!(ErrorKind::TypeMismatch.code(), -10);
    }

    #[test]
    fn construction_failed_keeps_source() {
        use std::error::Error as _;

        let err = StowageError::ConstructionFailed {
            target: CallTarget::Constructor("app::connect"),
            source: "connection refused".into(),
        };
        assert!(err.to_string().contains("connection refused"));
        assert!(err.source().is_some());
    }
}
