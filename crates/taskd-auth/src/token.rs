//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a shared secret. A token is a
//! self-contained serialization of [`IdentityClaims`] plus an expiry;
//! verifying one needs only the secret and a clock, so verification is
//! safe to run concurrently on every request with no shared mutable state.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use taskd_core::User;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Identity claims embedded in a bearer token.
///
/// `name` and `email` are denormalized copies of the user record taken at
/// issuance time, so authenticated requests need no user lookup. Claims
/// are immutable once issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject: the user ID.
    pub sub: Uuid,

    /// Display name at issuance time.
    pub name: String,

    /// Email at issuance time.
    pub email: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Service for issuing and verifying bearer tokens.
///
/// Thread-safe (`Send + Sync`); share it behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: u64,
}

impl TokenService {
    /// Creates a new token service from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the config is invalid
    /// (empty secret, zero lifetime). Callers run this at startup so a
    /// bad configuration never reaches the request path.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;
        let secret = config.secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl_secs: config.token_ttl_secs,
        })
    }

    /// Builds claims for a user with the configured lifetime.
    #[must_use]
    pub fn claims_for(&self, user: &User) -> IdentityClaims {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        IdentityClaims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.token_ttl_secs as i64,
        }
    }

    /// Issues a signed token for a user.
    ///
    /// Pure function of (user, secret, clock, configured lifetime); no
    /// side effects.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EncodingError` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.encode(&self.claims_for(user))
    }

    /// Encodes pre-built claims into a signed token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EncodingError` if signing fails.
    pub fn encode(&self, claims: &IdentityClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::encoding_error(e.to_string()))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Succeeds iff the signature matches the configured secret and the
    /// token has not expired. Every failure mode maps to the single
    /// `AuthError::InvalidToken`; the cause is logged at debug level only.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for malformed, expired, or
    /// forged tokens alike.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        match decode::<IdentityClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "token verification failed");
                Err(AuthError::InvalidToken)
            }
        }
    }

    /// Returns the configured token lifetime in seconds.
    #[must_use]
    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::from_config(&AuthConfig {
            secret: secret.to_string(),
            token_ttl_secs: 3600,
        })
        .unwrap()
    }

    fn sample_user() -> User {
        User::new("Ana", "ana@example.com")
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let result = TokenService::from_config(&AuthConfig {
            secret: "  ".to_string(),
            token_ttl_secs: 3600,
        });
        assert!(matches!(result, Err(AuthError::Configuration { .. })));
    }

    #[test]
    fn issued_token_verifies_with_embedded_claims() {
        let service = service("test-secret");
        let user = sample_user();

        let token = service.issue(&user).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service("test-secret");
        let user = sample_user();

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = IdentityClaims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = service.encode(&claims).unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = service("secret-a");
        let verifier = service("secret-b");

        let token = issuer.issue(&sample_user()).unwrap();
        let result = verifier.verify(&token);

        // Indistinguishable from any other invalid token.
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_rejected_identically() {
        let service = service("test-secret");
        assert!(matches!(
            service.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
