//! Cache-aside middleware for GET responses.
//!
//! Successful (2xx) GET response bodies are stored in the `CacheBackend`
//! under a scope-prefixed key and replayed until the entry expires or the
//! scope is invalidated by a mutation.
//!
//! ## Cache Key Format
//!
//! `{scope}:{path}` with the query string appended when present, e.g.
//! `tasks:/tasks` or `tasks:/tasks?completed=true`. Requests that differ
//! only in their query string cache independently.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::backend::CacheBackend;

/// A cached route: one scope with one TTL over the shared backend.
#[derive(Clone)]
pub struct ResponseCache {
    backend: CacheBackend,
    scope: &'static str,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a response cache for one route scope.
    pub fn new(backend: CacheBackend, scope: &'static str, ttl: Duration) -> Self {
        Self {
            backend,
            scope,
            ttl,
        }
    }

    /// Generate the cache key for a request URI.
    fn cache_key(&self, uri: &Uri) -> String {
        match uri.query() {
            Some(q) => format!("{}:{}?{q}", self.scope, uri.path()),
            None => format!("{}:{}", self.scope, uri.path()),
        }
    }
}

/// Middleware that serves GET requests from the cache when possible.
///
/// Non-GET requests pass through untouched. On a miss the handler runs,
/// and only a 2xx response body is stored; errors and redirects are never
/// cached. Cache failures degrade to a miss.
pub async fn cache_response(
    State(cache): State<ResponseCache>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let key = cache.cache_key(req.uri());

    if let Some(data) = cache.backend.get(&key, cache.ttl).await {
        tracing::debug!(key = %key, "serving cached response");
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            Body::from(data.as_ref().clone()),
        )
            .into_response();
    }

    let response = next.run(req).await;
    if !response.status().is_success() {
        return response;
    }

    // Buffer the body so it can be both stored and returned.
    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            // A buffering error means the body stream itself failed, so
            // the response was undeliverable with or without the cache;
            // there are no bytes left to hand back.
            tracing::warn!(key = %key, error = %e, "response body failed while buffering");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    cache.backend.set(&key, bytes.to_vec(), cache.ttl).await;

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> ResponseCache {
        ResponseCache::new(CacheBackend::new_local(), "tasks", Duration::from_secs(30))
    }

    #[test]
    fn cache_key_includes_path() {
        let uri: Uri = "/tasks".parse().unwrap();
        assert_eq!(cache().cache_key(&uri), "tasks:/tasks");
    }

    #[test]
    fn cache_key_includes_query_string() {
        let uri: Uri = "/tasks?completed=true".parse().unwrap();
        assert_eq!(cache().cache_key(&uri), "tasks:/tasks?completed=true");
    }
}
