use axum::extract::State;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use taskd_auth::{AuthState, bearer_token, unauthorized_response};

// =============================================================================
// Authentication Middleware
// =============================================================================

/// Authentication middleware that validates Bearer tokens and injects claims.
///
/// This middleware:
/// 1. Checks if the request should skip authentication (public endpoints
///    and uncredentialed task reads)
/// 2. Extracts and verifies the Bearer token
/// 3. Stores the `IdentityClaims` in request extensions for downstream use
///
/// Every failure mode returns the same 401: clients cannot distinguish a
/// missing header from an expired or forged token.
pub async fn authentication_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Skip authentication for public endpoints
    if should_skip_authentication(&req) {
        return next.run(req).await;
    }

    let Some(token) = bearer_token(&req) else {
        tracing::debug!(path = %req.uri().path(), "No bearer credential");
        return unauthorized_response();
    };

    match state.tokens.verify(token) {
        Ok(claims) => {
            tracing::debug!(subject = %claims.sub, "Token verified");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            unauthorized_response()
        }
    }
}

/// Check if a request should skip authentication.
fn should_skip_authentication(req: &Request<Body>) -> bool {
    let path = req.uri().path();

    // Public endpoints that never require authentication
    let public_paths = ["/", "/healthz", "/readyz", "/metrics", "/auth/identify"];
    if public_paths.contains(&path) {
        return true;
    }

    // Task reads are public (and served from the cache); mutations and
    // /auth/me require a credential.
    req.method() == Method::GET && path.starts_with("/tasks")
}

// =============================================================================
// Other Middleware
// =============================================================================

// Middleware that ensures each request has an X-Request-Id and mirrors it on the response
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static("x-request-id");

    // If the incoming request already has a request-id, preserve it; otherwise generate one
    let req_id_value = req
        .headers()
        .get(&header_name)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    // Add to request extensions for downstream usage (e.g., logging)
    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;

    // Add/propagate the request id header to response
    res.headers_mut().insert(header_name.clone(), req_id_value);

    res
}

// Middleware that records per-request Prometheus metrics.
pub async fn track_http(req: Request<Body>, next: Next) -> Response {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let start = std::time::Instant::now();

    let res = next.run(req).await;

    crate::metrics::record_http_request(&method, &path, res.status().as_u16(), start.elapsed());

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn public_endpoints_skip_authentication() {
        assert!(should_skip_authentication(&request(Method::GET, "/healthz")));
        assert!(should_skip_authentication(&request(
            Method::POST,
            "/auth/identify"
        )));
        assert!(should_skip_authentication(&request(Method::GET, "/tasks")));
        assert!(should_skip_authentication(&request(
            Method::GET,
            "/tasks/abc"
        )));
    }

    #[test]
    fn protected_endpoints_require_authentication() {
        assert!(!should_skip_authentication(&request(Method::POST, "/tasks")));
        assert!(!should_skip_authentication(&request(
            Method::PUT,
            "/tasks/abc"
        )));
        assert!(!should_skip_authentication(&request(
            Method::DELETE,
            "/tasks/abc"
        )));
        assert!(!should_skip_authentication(&request(Method::GET, "/auth/me")));
    }
}
