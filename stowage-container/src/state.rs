//! Per-identifier service lifecycle.
//!
//! Every identifier moves forward through three states and never back:
//! ```text
//! Unregistered ──register()──> Registered ──get()──> Resolved
//!       └──────────────────set()───────────────────────┘
//! ```
use std::fmt;

/// Where an identifier is in its lifecycle.
///
/// # Examples
/// ```
/// use stowage_container::state::ServiceState;
///
/// assert!(ServiceState::Resolved > ServiceState::Registered);
/// assert!(ServiceState::Registered.is_registered());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceState {
    /// No definition exists for the identifier.
    Unregistered,

    /// A definition exists but nothing has been built from it yet.
    Registered,

    /// The singleton instance has been built and cached.
    ///
    /// Every further `get()` returns this same instance.
    Resolved,
}

impl ServiceState {
    /// Returns `true` if a definition exists.
    #[inline]
    pub fn is_registered(&self) -> bool {
        matches!(self, ServiceState::Registered | ServiceState::Resolved)
    }

    /// Returns `true` if the instance is cached.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, ServiceState::Resolved)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Unregistered => write!(f, "Unregistered"),
            ServiceState::Registered => write!(f, "Registered"),
            ServiceState::Resolved => write!(f, "Resolved"),
        }
    }
}
