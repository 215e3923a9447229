//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Configuration for credential issuance and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC signing secret. Required; there is deliberately no
    /// default so a missing secret fails startup validation instead of
    /// silently issuing forgeable tokens.
    #[serde(default)]
    pub secret: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl_secs() -> u64 {
    // 30 days
    30 * 24 * 60 * 60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the secret is empty or the
    /// lifetime is zero.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.trim().is_empty() {
            return Err(AuthError::configuration(
                "auth.secret must be set (TASKD__AUTH__SECRET)",
            ));
        }
        if self.token_ttl_secs == 0 {
            return Err(AuthError::configuration("auth.token_ttl_secs must be > 0"));
        }
        Ok(())
    }
}
