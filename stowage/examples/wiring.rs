//! Wiring a small service graph with Stowage.
//!
//! Run with `RUST_LOG=stowage_container=trace` to watch resolution.

use std::sync::Arc;

use stowage::prelude::*;
use tracing_subscriber::EnvFilter;

// === Define your services ===

struct Config {
    database_url: String,
    debug: bool,
}

struct ConsoleLogger {
    prefix: &'static str,
}

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[{}] {msg}", self.prefix);
    }
}

struct Database {
    url: String,
    logger: Arc<ConsoleLogger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserService {
    db: Arc<Database>,
    logger: Option<Arc<ConsoleLogger>>,
    page_size: u32,
}

impl UserService {
    fn new(db: Arc<Database>) -> Self {
        UserService {
            db,
            logger: None,
            page_size: 10,
        }
    }

    fn set_logger(&mut self, logger: Arc<ConsoleLogger>) {
        self.logger = Some(logger);
    }

    fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size;
    }

    fn get_user(&self, id: u64) -> String {
        if let Some(logger) = &self.logger {
            logger.log(&format!("Getting user {id} (page size {})", self.page_size));
        }
        self.db
            .query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stowage_container=debug")),
        )
        .init();

    let container = Container::builder().strict_method_calls(true).build();

    // Config: built ahead of time
    container.set(
        "config",
        Arc::new(Config {
            database_url: "postgres://localhost/myapp".to_string(),
            debug: true,
        }),
    )?;

    // Logger: literal constructor argument
    container
        .register(
            "logger",
            Source::constructor(|prefix: &'static str| ConsoleLogger { prefix }),
        )?
        .add_argument(Argument::new("LOG"));

    // Database: depends on Config + Logger
    container
        .register(
            "database",
            Source::try_constructor(|config: Arc<Config>, logger: Arc<ConsoleLogger>| {
                if config.database_url.is_empty() {
                    return Err("database_url is empty");
                }
                Ok(Database {
                    url: config.database_url.clone(),
                    logger,
                })
            }),
        )?
        .add_argument(Argument::reference("config"))
        .add_argument(Argument::reference("logger"));

    // UserService: constructor injection plus setter injection
    let users = container.register("UserService", Source::constructor(UserService::new))?;
    users
        .add_argument(Argument::reference("database"))
        .add_method_call(Method::new("set_logger").reference("logger"))
        .add_method_call(Method::new("set_page_size").arg(25u32));
    users
        .with_method("set_logger", UserService::set_logger)?
        .with_method("set_page_size", UserService::set_page_size)?;

    container.validate()?;
    tracing::info!(services = container.len(), "Wiring complete");
    println!("✅ Container validated: {container:?}");

    let config = container.get_as::<Config>("config")?;
    println!(
        "📋 Config: database_url={}, debug={}",
        config.database_url, config.debug
    );

    // Identifiers are matched case-insensitively
    let service = container.get_as::<UserService>("userservice")?;
    println!("👤 {}", service.get_user(42));

    let again = container.must_get("USERSERVICE");
    let same = again
        .downcast::<UserService>()
        .is_some_and(|s| Arc::ptr_eq(&s, &service));
    println!("🔁 Same instance: {same}");

    for id in container.identifiers() {
        println!("  {id}: {}", container.state(&id));
    }

    match container.get("mailer") {
        Err(err) => println!("\n❌ {err}"),
        Ok(_) => unreachable!("nothing is registered as mailer"),
    }

    println!("\n🎉 Everything works!");
    Ok(())
}
