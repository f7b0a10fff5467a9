//! # The Container
//!
//! A singleton registry: maps identifiers to [`Definition`]s and builds
//! each service at most once, on its first [`get`](Container::get).
//!
//! # Architecture
//! ```text
//! register(id, source) ──> definitions ──get(id), cache miss──> resolver::resolve
//!                                                                   │
//!            services <──────────── cache store ────────────────────┘
//!                │                 (references call back into get)
//!        get(id), cache hit
//! ```
//!
//! # Examples
//! ```rust
//! use stowage_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Transport { host: String }
//!
//! struct Mailer { transport: Arc<Transport>, sender: String }
//!
//! impl Mailer {
//!     fn set_sender(&mut self, sender: String) { self.sender = sender; }
//! }
//!
//! let container = Container::new();
//!
//! container
//!     .register("transport", Source::constructor(|host: String| Transport { host }))
//!     .unwrap()
//!     .add_argument(Argument::new(String::from("smtp.example.com")));
//!
//! let mailer = container
//!     .register(
//!         "mailer",
//!         Source::constructor(|transport: Arc<Transport>| Mailer {
//!             transport,
//!             sender: String::new(),
//!         }),
//!     )
//!     .unwrap();
//! mailer
//!     .add_argument(Argument::reference("transport"))
//!     .add_method_call(Method::new("set_sender").arg(String::from("noreply")));
//! mailer.with_method("set_sender", Mailer::set_sender).unwrap();
//!
//! let mailer = container.get_as::<Mailer>("Mailer").unwrap();
//! assert_eq!(mailer.transport.host, "smtp.example.com");
//! assert_eq!(mailer.sender, "noreply");
//! ```

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::{debug, info, instrument, trace, warn};

use stowage_support::rendering::suggest_similar;

use crate::definition::{Definition, Source};
use crate::error::{CyclicReferenceError, Result, ServiceNotFoundError, StowageError};
use crate::graph::{GraphValidator, Node};
use crate::instance::Instance;
use crate::options::ContainerOptions;
use crate::registry::Registry;
use crate::resolver::{self, Resolver};
use crate::state::ServiceState;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with non-default options.
///
/// # Examples
/// ```rust
/// use stowage_container::prelude::*;
///
/// let container = Container::builder().strict_method_calls(true).build();
/// assert!(container.options().strict_method_calls);
/// ```
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    options: ContainerOptions,
}

impl ContainerBuilder {
    /// Fail resolution on method calls naming unexposed methods.
    pub fn strict_method_calls(mut self, strict: bool) -> Self {
        self.options.strict_method_calls = strict;
        self
    }

    /// Replaces all options at once, e.g. with deserialized ones.
    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Container {
        Container::with_options(self.options)
    }
}

// ============================================================
// Container
// ============================================================

/// Identifier-addressed singleton registry.
///
/// `Send + Sync`: share it behind an `Arc` or by reference. Cache hits
/// never block. Cache misses are serialized so every identifier is
/// constructed at most once, even under concurrent [`get`](Self::get).
pub struct Container {
    definitions: Registry<Arc<Definition>>,
    services: Registry<Instance>,
    /// Identifiers in resolution on the lock-holding thread, outermost first
    resolving: ReentrantMutex<RefCell<Vec<String>>>,
    options: ContainerOptions,
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            definitions: Registry::new(),
            services: Registry::new(),
            resolving: ReentrantMutex::new(RefCell::new(Vec::new())),
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Registers a definition built from `source` under `id`.
    ///
    /// Returns the stored definition so arguments and method calls can
    /// be chained onto it.
    ///
    /// # Errors
    /// - [`StowageError::MalformedSource`]: `source` produces `()`
    /// - [`StowageError::DefinitionConflict`]: `id` is taken, in any
    ///   letter case; the existing definition is kept
    pub fn register(&self, id: &str, source: impl Into<Source>) -> Result<Arc<Definition>> {
        let definition = Arc::new(Definition::new(source)?);

        if !self.definitions.insert_new(id, Arc::clone(&definition)) {
            return Err(StowageError::DefinitionConflict { id: id.to_owned() });
        }

        debug!(id, service_type = %definition.service_type(), "Registered definition");
        Ok(definition)
    }

    /// Registers `service` under `id` and caches it as already resolved.
    ///
    /// Every later [`get`](Self::get) returns this exact instance.
    ///
    /// # Errors
    /// - [`StowageError::ServiceInvalid`]: `service` is `()`
    /// - [`StowageError::DefinitionConflict`]: `id` is taken
    pub fn set<T: Send + Sync + 'static>(&self, id: &str, service: Arc<T>) -> Result<()> {
        let invalid = |reason: String| StowageError::ServiceInvalid {
            id: id.to_owned(),
            reason,
        };
        let definition =
            Definition::new(Source::shared(service)).map_err(|err| invalid(err.to_string()))?;
        let instance = definition
            .instance()
            .cloned()
            .ok_or_else(|| invalid("definition holds no instance".to_owned()))?;
        let definition = Arc::new(definition);

        if !self.definitions.insert_new(id, Arc::clone(&definition)) {
            return Err(StowageError::DefinitionConflict { id: id.to_owned() });
        }

        // A concurrent get may have cached the same instance first.
        if !self.services.insert_new(id, instance) {
            trace!(id, "Instance already cached");
        }
        definition.mark_resolved();

        debug!(id, service_type = %definition.service_type(), "Set service instance");
        Ok(())
    }

    /// Returns the service registered under `id`, building it on first use.
    ///
    /// `id` is matched exactly first, then case-insensitively.
    ///
    /// # Errors
    /// - [`StowageError::ServiceNotFound`]: nothing is registered under `id`
    /// - [`StowageError::CyclicReference`]: `id` is already being resolved
    ///   further up the reference chain
    /// - any resolution error for `id` or the services it references; the
    ///   identifier then stays unresolved
    pub fn get(&self, id: &str) -> Result<Instance> {
        if let Some(instance) = self.services.get(id) {
            trace!(id, "Service cache hit");
            return Ok(instance);
        }

        self.construct(id)
    }

    /// [`get`](Self::get) followed by a downcast to `T`.
    ///
    /// # Errors
    /// As [`get`](Self::get), plus [`StowageError::TypeMismatch`] if the
    /// service is not a `T`.
    pub fn get_as<T: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<T>> {
        let instance = self.get(id)?;
        instance
            .downcast::<T>()
            .ok_or_else(|| StowageError::TypeMismatch {
                subject: format!("Service \"{id}\""),
                expected: std::any::type_name::<T>(),
                found: instance.service_type().type_name(),
            })
    }

    /// [`get`](Self::get) for startup wiring, where failure is fatal.
    ///
    /// # Panics
    /// Panics with the error message if `get` fails.
    pub fn must_get(&self, id: &str) -> Instance {
        match self.get(id) {
            Ok(instance) => instance,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns `true` if a definition is registered under `id`.
    pub fn has_definition(&self, id: &str) -> bool {
        self.definitions.contains(id)
    }

    /// Returns the definition registered under `id`.
    ///
    /// # Errors
    /// [`StowageError::ServiceNotFound`] if there is none.
    pub fn get_definition(&self, id: &str) -> Result<Arc<Definition>> {
        self.definitions
            .get(id)
            .ok_or_else(|| self.not_found(id, None))
    }

    /// Where `id` is in its lifecycle.
    pub fn state(&self, id: &str) -> ServiceState {
        if self.services.contains(id) {
            ServiceState::Resolved
        } else if self.definitions.contains(id) {
            ServiceState::Registered
        } else {
            ServiceState::Unregistered
        }
    }

    /// Checks every reference between definitions without building
    /// anything.
    ///
    /// # Errors
    /// - [`StowageError::ServiceNotFound`]: a reference names nothing
    /// - [`StowageError::CyclicReference`]: references form a cycle
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<()> {
        let nodes: Vec<Node> = self
            .definitions
            .entries()
            .into_iter()
            .map(|(id, definition)| Node {
                id,
                references: definition.references(),
            })
            .collect();
        let count = nodes.len();

        GraphValidator::new(nodes).validate()?;

        info!(definition_count = count, "Container validated");
        Ok(())
    }

    /// All registered identifiers, as registered, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        self.definitions.identifiers()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Cache-miss path, serialized on the resolution lock.
    #[instrument(skip(self), level = "debug")]
    fn construct(&self, id: &str) -> Result<Instance> {
        let resolving = self.resolving.lock();

        // Another thread may have finished while we waited.
        if let Some(instance) = self.services.get(id) {
            trace!(id, "Service cache hit after lock");
            return Ok(instance);
        }

        let (stored, definition) = self
            .definitions
            .lookup(id)
            .ok_or_else(|| self.not_found(id, resolving.borrow().last().cloned()))?;
        let stored = stored.into_owned();

        if let Some(chain) = cycle(&resolving.borrow(), &stored) {
            warn!(cycle = ?chain, "Reference cycle detected during resolution");
            return Err(StowageError::CyclicReference(
                CyclicReferenceError { chain },
            ));
        }

        let instance = {
            let _frame = Frame::push(&resolving, stored.clone());
            resolver::resolve(&definition, self, &self.options)?
        };

        // Only `set` can race this insert, and it caches the instance its
        // own definition resolves to.
        if !self.services.insert_new(&stored, instance.clone()) {
            trace!(id = %stored, "Instance already cached by set");
        }
        definition.mark_resolved();

        debug!(id = %stored, service_type = %instance.service_type(), "Resolved service");
        Ok(instance)
    }

    fn not_found(&self, id: &str, required_by: Option<String>) -> StowageError {
        StowageError::ServiceNotFound(ServiceNotFoundError {
            requested: id.to_owned(),
            required_by,
            suggestions: suggest_similar(id, &self.definitions.identifiers(), 3),
        })
    }
}

impl Resolver for Container {
    fn resolve_reference(&self, id: &str) -> Result<Instance> {
        self.get(id)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.definitions.len())
            .field("resolved", &self.services.len())
            .field("options", &self.options)
            .finish()
    }
}

/// Returns the cycle closed by re-entering `id`, if it is on `stack`.
fn cycle(stack: &[String], id: &str) -> Option<Vec<String>> {
    let start = stack.iter().position(|entry| entry == id)?;
    let mut chain = stack[start..].to_vec();
    chain.push(id.to_owned());
    Some(chain)
}

/// One entry on the resolution stack, popped on drop (including unwinds).
struct Frame<'a> {
    stack: &'a RefCell<Vec<String>>,
}

impl<'a> Frame<'a> {
    fn push(stack: &'a RefCell<Vec<String>>, id: String) -> Self {
        stack.borrow_mut().push(id);
        Self { stack }
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::constructor::Constructor;
    pub use crate::definition::{Definition, Source};
    pub use crate::error::{ErrorKind, Result, StowageError};
    pub use crate::instance::Instance;
    pub use crate::method::{ExposedMethod, Method};
    pub use crate::options::ContainerOptions;
    pub use crate::resolver::Resolver;
    pub use crate::service_type::ServiceType;
    pub use crate::state::ServiceState;
    pub use crate::value::{Argument, Reference};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::method::Method;
    use crate::value::Argument;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Foo {
        number: i32,
        text: String,
    }

    impl Foo {
        fn new(number: i32, text: String) -> Self {
            Foo { number, text }
        }

        fn bar(&mut self, number: i32, text: String) {
            self.number = number;
            self.text = text;
        }
    }

    struct Bar {
        foo: Arc<Foo>,
    }

    fn register_foo(container: &Container, id: &str) -> Arc<Definition> {
        let def = container
            .register(id, Source::constructor(Foo::new))
            .unwrap();
        def.add_arguments([Argument::new(100), Argument::new(String::from("x"))]);
        def
    }

    #[test]
    fn resolves_constructor_arguments() {
        let container = Container::new();
        register_foo(&container, "foo");

        let foo = container.get_as::<Foo>("foo").unwrap();
        assert_eq!(foo.number, 100);
        assert_eq!(foo.text, "x");
    }

    #[test]
    fn resolution_is_idempotent() {
        let calls = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        container
            .register(
                "counter",
                Source::constructor({
                    let calls = calls.clone();
                    move || calls.fetch_add(1, Ordering::SeqCst)
                }),
            )
            .unwrap();

        let a = container.get("counter").unwrap();
        let b = container.get("counter").unwrap();
        let c = container.get("COUNTER").unwrap();

        assert!(a.ptr_eq(&b));
        assert!(a.ptr_eq(&c));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn identifiers_are_case_insensitive() {
        let container = Container::new();
        register_foo(&container, "Foo");

        let upper = container.get("FOO").unwrap();
        let lower = container.get("foo").unwrap();
        let exact = container.get("Foo").unwrap();

        assert!(upper.ptr_eq(&lower));
        assert!(upper.ptr_eq(&exact));
        assert!(container.has_definition("fOO"));
        assert!(container.get_definition("FOO").is_ok());
    }

    #[test]
    fn conflict_keeps_original_definition() {
        let container = Container::new();
        let original = register_foo(&container, "foo");

        for id in ["foo", "FOO"] {
            match container.register(id, Source::instance(7u8)) {
                Err(err @ StowageError::DefinitionConflict { .. }) => {
                    assert_eq!(err.kind(), ErrorKind::DefinitionConflict);
                    assert_eq!(err.code(), -1);
                }
                other => panic!("Expected DefinitionConflict, got: {other:?}"),
            }
        }

        let stored = container.get_definition("foo").unwrap();
        assert!(Arc::ptr_eq(&stored, &original));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn conflict_after_resolution_keeps_original_instance() {
        let container = Container::new();
        register_foo(&container, "foo");
        let first = container.get("foo").unwrap();

        assert!(matches!(
            container.register("FOO", Source::instance(Foo::new(7, "other".into()))),
            Err(StowageError::DefinitionConflict { .. })
        ));

        for id in ["foo", "FOO"] {
            let again = container.get(id).unwrap();
            assert!(again.ptr_eq(&first));
        }

        let foo = container.get_as::<Foo>("foo").unwrap();
        assert_eq!(foo.number, 100);
        assert_eq!(foo.text, "x");
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn malformed_source_is_not_registered() {
        let container = Container::new();
        assert!(matches!(
            container.register("unit", Source::constructor(|| ())),
            Err(StowageError::MalformedSource(_))
        ));
        assert!(!container.has_definition("unit"));
    }

    #[test]
    fn reference_argument_is_the_set_instance() {
        let container = Container::new();
        let foo = Arc::new(Foo::new(123, "existing_service".into()));
        container.set("foo", foo.clone()).unwrap();

        container
            .register("bar", Source::constructor(|foo: Arc<Foo>| Bar { foo }))
            .unwrap()
            .add_argument(Argument::reference("foo"));

        let bar = container.get_as::<Bar>("bar").unwrap();
        assert!(Arc::ptr_eq(&bar.foo, &foo));
        assert!(Arc::ptr_eq(&container.get_as::<Foo>("foo").unwrap(), &foo));
    }

    #[test]
    fn references_resolve_depth_first_and_cache() {
        let container = Container::new();
        register_foo(&container, "foo");
        container
            .register("bar", Source::constructor(|foo: Arc<Foo>| Bar { foo }))
            .unwrap()
            .add_argument(Argument::reference("FOO"));

        assert_eq!(container.state("foo"), ServiceState::Registered);
        let bar = container.get_as::<Bar>("bar").unwrap();

        assert_eq!(container.state("foo"), ServiceState::Resolved);
        assert!(Arc::ptr_eq(&bar.foo, &container.get_as::<Foo>("foo").unwrap()));
    }

    #[test]
    fn method_calls_are_applied() {
        let container = Container::new();
        let def = register_foo(&container, "foo");
        def.with_method("Bar", Foo::bar).unwrap();
        def.add_method_call(
            Method::new("Bar")
                .arg(999)
                .arg(String::from("bar_was_called")),
        );

        let foo = container.get_as::<Foo>("foo").unwrap();
        assert_eq!(foo.number, 999);
        assert_eq!(foo.text, "bar_was_called");
    }

    #[test]
    fn failed_method_call_reference_is_not_cached() {
        struct Mailer {
            transport: Option<Arc<Foo>>,
        }

        impl Mailer {
            fn set_transport(&mut self, transport: Arc<Foo>) {
                self.transport = Some(transport);
            }
        }

        let built = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        let def = container
            .register(
                "mailer",
                Source::constructor({
                    let built = built.clone();
                    move || {
                        built.fetch_add(1, Ordering::SeqCst);
                        Mailer { transport: None }
                    }
                }),
            )
            .unwrap();
        def.with_method("set_transport", Mailer::set_transport)
            .unwrap();
        def.add_method_call(Method::new("set_transport").reference("transport"));

        match container.get("mailer") {
            Err(StowageError::ServiceNotFound(err)) => {
                assert_eq!(err.requested, "transport");
                assert_eq!(err.required_by.as_deref(), Some("mailer"));
            }
            other => panic!("Expected ServiceNotFound, got: {other:?}"),
        }
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(container.state("mailer"), ServiceState::Registered);
        assert!(!def.is_resolved());

        let transport = Arc::new(Foo::new(25, "smtp".into()));
        container.set("transport", transport.clone()).unwrap();

        let mailer = container.get_as::<Mailer>("mailer").unwrap();
        assert!(Arc::ptr_eq(mailer.transport.as_ref().unwrap(), &transport));
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_eq!(container.state("mailer"), ServiceState::Resolved);
    }

    #[test]
    fn method_call_arity_mismatch_leaves_service_unresolved() {
        let container = Container::new();
        let def = register_foo(&container, "foo");
        def.with_method("Bar", Foo::bar).unwrap();
        def.add_method_call(Method::new("Bar"));

        for _ in 0..2 {
            match container.get("foo") {
                Err(StowageError::ArityMismatch(err)) => {
                    assert_eq!(err.expected, 2);
                    assert_eq!(err.given, 0);
                }
                other => panic!("Expected ArityMismatch, got: {other:?}"),
            }
        }
        assert_eq!(container.state("foo"), ServiceState::Registered);
        assert!(!def.is_resolved());
    }

    #[test]
    fn missing_method_skipped_when_lenient() {
        let container = Container::new();
        register_foo(&container, "foo").add_method_call(Method::new("Missing"));

        assert_eq!(container.get_as::<Foo>("foo").unwrap().number, 100);
    }

    #[test]
    fn missing_method_fails_when_strict() {
        let container = Container::builder().strict_method_calls(true).build();
        register_foo(&container, "foo").add_method_call(Method::new("Missing"));

        match container.get("foo") {
            Err(err @ StowageError::MethodNotFound { .. }) => {
                assert_eq!(err.kind(), ErrorKind::MethodNotFound);
            }
            other => panic!("Expected MethodNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn not_found_names_requested_identifier() {
        let container = Container::new();

        match container.get("nonexistent") {
            Err(StowageError::ServiceNotFound(err)) => {
                assert_eq!(err.requested, "nonexistent");
                assert!(err.required_by.is_none());
            }
            other => panic!("Expected ServiceNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn not_found_reports_dependent_and_suggestions() {
        let container = Container::new();
        register_foo(&container, "foo_service");
        container
            .register("bar", Source::constructor(|foo: Arc<Foo>| Bar { foo }))
            .unwrap()
            .add_argument(Argument::reference("foo"));

        match container.get("bar") {
            Err(StowageError::ServiceNotFound(err)) => {
                assert_eq!(err.requested, "foo");
                assert_eq!(err.required_by.as_deref(), Some("bar"));
                assert_eq!(err.suggestions, ["foo_service"]);
            }
            other => panic!("Expected ServiceNotFound, got: {other:?}"),
        }
        assert_eq!(container.state("bar"), ServiceState::Registered);
    }

    #[test]
    #[should_panic(expected = "No service \"nonexistent\" was found")]
    fn must_get_panics_on_missing_service() {
        Container::new().must_get("nonexistent");
    }

    #[test]
    fn must_get_returns_instance() {
        let container = Container::new();
        register_foo(&container, "foo");
        assert!(container.must_get("foo").is::<Foo>());
    }

    #[test]
    fn reference_cycle_detected() {
        struct A;
        struct B;

        let container = Container::new();
        container
            .register("a", Source::constructor(|_: Arc<B>| A))
            .unwrap()
            .add_argument(Argument::reference("b"));
        container
            .register("b", Source::constructor(|_: Arc<A>| B))
            .unwrap()
            .add_argument(Argument::reference("A"));

        match container.get("a") {
            Err(StowageError::CyclicReference(err)) => {
                assert_eq!(err.chain, ["a", "b", "a"]);
            }
            other => panic!("Expected CyclicReference, got: {other:?}"),
        }

        assert_eq!(container.state("a"), ServiceState::Registered);
        assert_eq!(container.state("b"), ServiceState::Registered);
        assert!(matches!(container.validate(), Err(StowageError::CyclicReference(_))));
    }

    #[test]
    fn resolution_stack_unwinds_after_failure() {
        let container = Container::new();
        container
            .register("bar", Source::constructor(|foo: Arc<Foo>| Bar { foo }))
            .unwrap()
            .add_argument(Argument::reference("foo"));

        assert!(container.get("bar").is_err());
        register_foo(&container, "foo");
        assert!(container.get("bar").is_ok());
    }

    #[test]
    fn concurrent_get_constructs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        container
            .register(
                "slow",
                Source::constructor({
                    let calls = calls.clone();
                    move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        Foo::new(1, "slow".into())
                    }
                }),
            )
            .unwrap();

        let instances: Vec<Instance> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| container.get("slow").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| i.ptr_eq(&instances[0])));
    }

    #[test]
    fn set_racing_get_yields_one_instance() {
        let container = Container::new();
        let config = Arc::new(Foo::new(5, "config".into()));

        let seen: Vec<Instance> = std::thread::scope(|scope| {
            let readers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        loop {
                            if let Ok(instance) = container.get("config") {
                                break instance;
                            }
                            std::thread::yield_now();
                        }
                    })
                })
                .collect();
            container.set("config", config.clone()).unwrap();
            readers.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for instance in &seen {
            assert!(Arc::ptr_eq(&instance.downcast::<Foo>().unwrap(), &config));
        }
        assert_eq!(container.state("config"), ServiceState::Resolved);
        assert!(container.get_definition("config").unwrap().is_resolved());
    }

    #[test]
    fn set_rejects_unit_instance() {
        let container = Container::new();

        match container.set("nothing", Arc::new(())) {
            Err(err @ StowageError::ServiceInvalid { .. }) => {
                assert_eq!(err.kind(), ErrorKind::ServiceInvalid);
                assert!(err.to_string().contains("nothing"));
            }
            other => panic!("Expected ServiceInvalid, got: {other:?}"),
        }
        assert!(!container.has_definition("nothing"));
    }

    #[test]
    fn set_conflicts_with_registered_definition() {
        let container = Container::new();
        register_foo(&container, "foo");

        assert!(matches!(
            container.set("Foo", Arc::new(Foo::new(1, "a".into()))),
            Err(StowageError::DefinitionConflict { .. })
        ));
        assert_eq!(container.state("foo"), ServiceState::Registered);
    }

    #[test]
    fn fallible_constructor_error_is_reported() {
        let container = Container::new();
        container
            .register(
                "db",
                Source::try_constructor(|url: String| -> std::result::Result<Foo, String> {
                    Err(format!("cannot connect to {url}"))
                }),
            )
            .unwrap()
            .add_argument(Argument::new(String::from("postgres://localhost")));

        match container.get("db") {
            Err(err @ StowageError::ConstructionFailed { .. }) => {
                let message = err.to_string();
                assert!(message.contains("cannot connect to postgres://localhost"));
            }
            other => panic!("Expected ConstructionFailed, got: {other:?}"),
        }
    }

    #[test]
    fn get_as_wrong_type() {
        let container = Container::new();
        register_foo(&container, "foo");

        match container.get_as::<Bar>("foo") {
            Err(StowageError::TypeMismatch {
                expected,
                found,
                ..
            }) => {
                assert!(expected.ends_with("Bar"));
                assert!(found.ends_with("Foo"));
            }
            other => panic!("Expected TypeMismatch, got: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn state_transitions() {
        let container = Container::new();
        assert_eq!(container.state("foo"), ServiceState::Unregistered);

        register_foo(&container, "foo");
        assert_eq!(container.state("foo"), ServiceState::Registered);

        container.get("foo").unwrap();
        assert_eq!(container.state("FOO"), ServiceState::Resolved);
        assert!(container.get_definition("foo").unwrap().is_resolved());

        container
            .set("bar", Arc::new(Foo::new(1, "a".into())))
            .unwrap();
        assert_eq!(container.state("bar"), ServiceState::Resolved);
    }

    #[test]
    fn validate_reports_dangling_reference() {
        let container = Container::new();
        register_foo(&container, "foo");
        container
            .register("bar", Source::constructor(|foo: Arc<Foo>| Bar { foo }))
            .unwrap()
            .add_argument(Argument::reference("foo"));
        assert!(container.validate().is_ok());

        register_foo(&container, "baz").add_method_call(Method::new("Bar").reference("missing"));
        match container.validate() {
            Err(StowageError::ServiceNotFound(err)) => {
                assert_eq!(err.requested, "missing");
                assert_eq!(err.required_by.as_deref(), Some("baz"));
            }
            other => panic!("Expected ServiceNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn introspection() {
        let container = Container::default();
        assert!(container.is_empty());

        register_foo(&container, "zeta");
        container.set("Alpha", Arc::new(1u32)).unwrap();

        assert_eq!(container.identifiers(), ["Alpha", "zeta"]);
        assert_eq!(container.len(), 2);
        assert!(matches!(
            container.get_definition("missing"),
            Err(StowageError::ServiceNotFound(_))
        ));

        let debug = format!("{container:?}");
        assert!(debug.contains("registered: 2"));
        assert!(debug.contains("resolved: 1"));
    }
}
