//! # Access Policy
//!
//! Request-level capability gate. The configured demo account may read
//! everything but write nothing; every other account may do both.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command ──► is_write()? ──no──► run                                   │
//! │                  │                                                      │
//! │                 yes                                                     │
//! │                  ▼                                                      │
//! │          acting user == demo user? ──yes──► FORBIDDEN (nothing stored)  │
//! │                  │                                                      │
//! │                  no ──► run                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::warn;

use crate::error::ApiError;
use crate::state::AppConfig;

/// Decides whether the acting account may perform writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    user: String,
    demo_user: String,
}

impl AccessPolicy {
    pub fn new(user: impl Into<String>, demo_user: impl Into<String>) -> Self {
        AccessPolicy {
            user: user.into(),
            demo_user: demo_user.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        AccessPolicy::new(config.user.clone(), config.demo_user.clone())
    }

    /// The account commands run as.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Whether the acting account is the read-only demo account.
    pub fn is_read_only(&self) -> bool {
        self.user == self.demo_user
    }

    /// Rejects `action` with `FORBIDDEN` when the acting account is read-only.
    pub fn authorize_write(&self, action: &str) -> Result<(), ApiError> {
        if self.is_read_only() {
            warn!(user = %self.user, action, "Write rejected for read-only account");
            return Err(ApiError::forbidden(format!(
                "User '{}' is read-only and cannot run {}",
                self.user, action
            )));
        }
        Ok(())
    }
}
