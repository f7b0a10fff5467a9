//! Container configuration.

use serde::Deserialize;

/// Knobs controlling how a [`Container`](crate::container::Container)
/// resolves services.
///
/// Deserializable so hosts can embed it in their own configuration;
/// missing fields take their defaults.
///
/// # Examples
/// ```
/// use stowage_container::options::ContainerOptions;
///
/// let options = ContainerOptions::default();
/// assert!(!options.strict_method_calls);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// Fail with `MethodNotFound` when a method call names a method the
    /// service type does not expose. When `false`, such calls are
    /// skipped with a warning.
    pub strict_method_calls: bool,
}
