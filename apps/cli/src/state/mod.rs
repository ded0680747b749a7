//! # State Module
//!
//! Everything a command needs besides its own arguments.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  AppConfig::from_env()                                                 │
//! │          │                                                              │
//! │          ├──────────────────┬──────────────────┐                        │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  AppConfig   │  │ AccessPolicy │  │    Database      │              │
//! │  │              │  │              │  │                  │              │
//! │  │  db_path     │  │  user        │  │  SqlitePool      │              │
//! │  │  user        │  │  demo_user   │  │  repositories    │              │
//! │  │  demo_user   │  │              │  │                  │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  All three are read-only once built; the pool is thread-safe.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod access;
mod config;

pub use access::AccessPolicy;
pub use config::{AppConfig, ConfigError};
