//! Building blocks for the authentication gate.
//!
//! The server owns the middleware itself (it decides which routes are
//! public); this module provides the pieces it composes: shared state,
//! header parsing, and the uniform rejection response.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::{
    Json,
    http::{Request, StatusCode, header::AUTHORIZATION},
    response::Response,
};
use serde_json::json;

use crate::token::TokenService;

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// Token service used for verification.
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

/// Extracts the bearer token from a request's `Authorization` header.
///
/// Returns `None` unless the header is present, uses the literal
/// `Bearer ` scheme prefix, and carries a non-empty token. A malformed
/// header is treated identically to a missing one.
#[must_use]
pub fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// The uniform 401 response used for every authentication failure.
///
/// Missing, malformed, expired, and forged credentials all map here;
/// clients cannot distinguish them.
#[must_use]
pub fn unauthorized_response() -> Response {
    let body = json!({ "error": "authentication required" });
    (
        StatusCode::UNAUTHORIZED,
        [("WWW-Authenticate", "Bearer")],
        Json(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_header(value: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/tasks");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn bearer_token_requires_exact_scheme() {
        assert_eq!(
            bearer_token(&request_with_header(Some("Bearer abc"))),
            Some("abc")
        );
        assert_eq!(bearer_token(&request_with_header(Some("bearer abc"))), None);
        assert_eq!(bearer_token(&request_with_header(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request_with_header(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request_with_header(Some("Bearer"))), None);
        assert_eq!(bearer_token(&request_with_header(None)), None);
    }
}
