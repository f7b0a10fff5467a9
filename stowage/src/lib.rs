//! # Stowage: a string-keyed singleton service container
//!
//! Register construction recipes under identifiers, then ask for fully
//! wired services by name. Each service is built once, on first request,
//! with its constructor arguments and references to other services
//! resolved depth-first, and its configured method calls applied.
//!
//! ```rust
//! use stowage::prelude::*;
//! use std::sync::Arc;
//!
//! struct Config { url: String }
//! struct Database { config: Arc<Config>, pool_size: u32 }
//!
//! impl Database {
//!     fn resize(&mut self, pool_size: u32) { self.pool_size = pool_size; }
//! }
//!
//! let container = Container::new();
//! container.set("config", Arc::new(Config { url: "postgres://localhost".into() }))?;
//!
//! let database = container.register(
//!     "database",
//!     Source::constructor(|config: Arc<Config>| Database { config, pool_size: 1 }),
//! )?;
//! database
//!     .add_argument(Argument::reference("config"))
//!     .add_method_call(Method::new("resize").arg(16u32));
//! database.with_method("resize", Database::resize)?;
//!
//! container.validate()?;
//!
//! let db = container.get_as::<Database>("Database")?;
//! assert_eq!(db.config.url, "postgres://localhost");
//! assert_eq!(db.pool_size, 16);
//! # Ok::<(), StowageError>(())
//! ```

pub use stowage_container::*;
pub use stowage_support::*;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    struct Greeter {
        greeting: String,
    }

    #[test]
    fn facade_exposes_container() {
        let container = Container::new();
        container
            .register(
                "greeter",
                Source::constructor(|greeting: String| Greeter { greeting }),
            )
            .unwrap()
            .add_argument(Argument::new(String::from("hello")));

        let greeter: Arc<Greeter> = container.get_as("greeter").unwrap();
        assert_eq!(greeter.greeting, "hello");
    }

    #[test]
    fn facade_exposes_rendering() {
        assert_eq!(
            super::rendering::render_chain(&["a", "b", "a"]),
            "a → b → a"
        );
    }
}
