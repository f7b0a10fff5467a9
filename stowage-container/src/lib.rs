//! Core container implementation for Stowage.
//!
//! Definitions describe how to build a service (a constructor or a
//! ready instance, positional arguments, post-construction method
//! calls). The [`Container`](container::Container) maps identifiers to
//! definitions and builds each service once, on first request.

mod call;
pub mod constructor;
pub mod container;
pub mod definition;
pub mod error;
mod graph;
pub mod instance;
pub mod method;
pub mod options;
mod registry;
pub mod resolver;
pub mod service_type;
pub mod state;
pub mod value;

pub use container::prelude;
pub use container::{Container, ContainerBuilder};
pub use definition::{Definition, Source};
pub use error::{ErrorKind, Result, StowageError};
pub use instance::Instance;
pub use options::ContainerOptions;
pub use service_type::ServiceType;
pub use state::ServiceState;
