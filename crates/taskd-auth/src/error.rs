//! Authentication error types.

/// Errors that can occur during authentication.
///
/// All verification failure modes (malformed token, expired, wrong
/// signature) collapse into the single `InvalidToken` variant: callers and
/// clients must not be able to distinguish them. The underlying cause is
/// logged where it occurs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential is missing, malformed, expired, or forged.
    #[error("invalid or expired credential")]
    InvalidToken,

    /// Failed to encode a token. Only expected for pathological claims.
    #[error("failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// The auth configuration is unusable (e.g. empty signing secret).
    /// Fatal at startup, never surfaced per-request.
    #[error("auth configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
