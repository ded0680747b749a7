//! # Stockbook CLI Library
//!
//! Command-line front end for the ledger. `main.rs` only wires the
//! environment to [`App`]; everything here runs the same against a file
//! database or an in-memory one.
//!
//! ## Module Organization
//! ```text
//! stockbook_cli/
//! ├── lib.rs          ◄─── You are here (App, tracing setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── AppConfig from environment
//! │   └── access.rs   ◄─── AccessPolicy (demo account is read-only)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Cli / Command (clap) and dispatch
//! │   ├── args.rs     ◄─── Argument groups
//! │   ├── catalog.rs  ◄─── Products, suppliers, customers
//! │   ├── ledger.rs   ◄─── Purchases and sales
//! │   ├── pricing.rs  ◄─── Price history
//! │   └── reports.rs  ◄─── Inventory, analytics, dashboard
//! └── error.rs        ◄─── ApiError returned by every command
//! ```

pub mod commands;
pub mod error;
pub mod state;

use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub use commands::{Cli, Command};
pub use error::{ApiError, ErrorCode};
pub use state::{AccessPolicy, AppConfig, ConfigError};
use stockbook_db::Database;

/// A connected ledger plus the policy of the account using it.
#[derive(Debug, Clone)]
pub struct App {
    db: Database,
    access: AccessPolicy,
}

impl App {
    pub fn new(db: Database, access: AccessPolicy) -> Self {
        App { db, access }
    }

    /// Opens (and migrates) the configured database.
    ///
    /// ## Startup Sequence
    /// ```text
    /// AppConfig ──► DbConfig (path, pool size) ──► Database::new
    ///                                              • WAL + foreign keys
    ///                                              • pending migrations
    /// ```
    pub async fn connect(config: &AppConfig) -> Result<Self, ApiError> {
        info!(db_path = %config.db_path.display(), user = %config.user, "Opening ledger");

        let db = Database::new(config.db_config()).await?;
        Ok(App::new(db, AccessPolicy::from_config(config)))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Runs one command, rejecting writes from a read-only account before
    /// anything is touched.
    pub async fn execute(&self, command: Command) -> Result<Value, ApiError> {
        let name = command.name();
        if command.is_write() {
            self.access.authorize_write(name)?;
        }

        debug!(command = name, user = %self.access.user(), "Running command");
        commands::execute(&self.db, command).await
    }

    /// Parses and runs `args` (without the program name).
    pub async fn run(&self, args: &[String]) -> Result<Value, ApiError> {
        let command = Command::from_args(args)?;
        self.execute(command).await
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout carries only command output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockbook_db=trace` - Trace the database layer only
/// - Default: INFO, with sqlx at WARN
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Unit Tests
// =============================================================================
