//! # Configuration State
//!
//! Application configuration loaded from environment variables at startup,
//! with a default for every value.
//!
//! | Variable                            | Default           |
//! |-------------------------------------|-------------------|
//! | `STOCKBOOK_DB_PATH`                 | `./stockbook.db`  |
//! | `STOCKBOOK_USER`                    | `admin`           |
//! | `STOCKBOOK_DEMO_USER` / `USER_DEMO` | `demo`            |
//! | `STOCKBOOK_MAX_CONNECTIONS`         | `5`               |
//!
//! Configuration is read-only after initialization.

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use stockbook_db::DbConfig;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Account the commands run as
    pub user: String,

    /// Read-only account; its writes are rejected
    pub demo_user: String,

    /// Upper bound of the connection pool
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from("./stockbook.db"),
            user: "admin".to_string(),
            demo_user: "demo".to_string(),
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset keys take their
    /// default; set-but-blank names are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let db_path = lookup("STOCKBOOK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let user = account(&lookup, &["STOCKBOOK_USER"])?.unwrap_or(defaults.user);

        let demo_user = account(&lookup, &["STOCKBOOK_DEMO_USER", "USER_DEMO"])?.unwrap_or(defaults.demo_user);

        let max_connections = match lookup("STOCKBOOK_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("STOCKBOOK_MAX_CONNECTIONS".to_string()))?,
            None => defaults.max_connections,
        };

        Ok(AppConfig {
            db_path,
            user,
            demo_user,
            max_connections,
        })
    }

    /// Database configuration for the configured file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone()).max_connections(self.max_connections)
    }
}

/// First of `keys` that is set, trimmed. A set but blank value is an error.
fn account<F>(lookup: &F, keys: &[&str]) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for key in keys {
        if let Some(raw) = lookup(key) {
            let name = raw.trim();
            if name.is_empty() {
                return Err(ConfigError::MissingRequired(key.to_string()));
            }
            return Ok(Some(name.to_string()));
        }
    }
    Ok(None)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.db_path, PathBuf::from("./stockbook.db"));
        assert_eq!(config.user, "admin");
        assert_eq!(config.demo_user, "demo");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOCKBOOK_DB_PATH", "/var/lib/stockbook/ledger.db"),
            ("STOCKBOOK_USER", " ana "),
            ("USER_DEMO", "visitante"),
            ("STOCKBOOK_MAX_CONNECTIONS", "8"),
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/stockbook/ledger.db"));
        assert_eq!(config.user, "ana");
        assert_eq!(config.demo_user, "visitante");
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn test_prefixed_demo_user_wins() {
        let config = load(&[("STOCKBOOK_DEMO_USER", "invitado"), ("USER_DEMO", "visitante")]).unwrap();
        assert_eq!(config.demo_user, "invitado");
    }

    #[test]
    fn test_invalid_max_connections() {
        for bad in ["zero", "0", "-3"] {
            let err = load(&[("STOCKBOOK_MAX_CONNECTIONS", bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == "STOCKBOOK_MAX_CONNECTIONS"));
        }
    }

    #[test]
    fn test_blank_user_rejected() {
        let err = load(&[("STOCKBOOK_USER", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }
}
