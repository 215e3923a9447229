//! Prometheus metrics: request counters and latency, cache hit rates.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
    pub const CACHE_HITS_TOTAL: &str = "cache_hits_total";
    pub const CACHE_MISSES_TOTAL: &str = "cache_misses_total";
}

/// Install the Prometheus recorder.
///
/// Call once at startup; repeated calls (tests spin several servers in
/// one process) return `false` and leave the first recorder in place.
pub fn init_metrics() -> bool {
    if RECORDER.get().is_some() {
        return false;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => RECORDER.set(handle).is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Prometheus recorder");
            false
        }
    }
}

/// Render the scrape payload for `/metrics`; `None` before init.
pub fn render_metrics() -> Option<String> {
    RECORDER.get().map(PrometheusHandle::render)
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let route = metric_route(path);

    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "route" => route.clone(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "route" => route,
    )
    .record(duration.as_secs_f64());
}

pub fn record_cache_hit(tier: &str) {
    counter!(names::CACHE_HITS_TOTAL, "tier" => tier.to_string()).increment(1);
}

pub fn record_cache_miss() {
    counter!(names::CACHE_MISSES_TOTAL).increment(1);
}

/// Collapse item paths so task ids do not blow up label cardinality.
fn metric_route(path: &str) -> String {
    match path.strip_prefix("/tasks/") {
        Some(rest) if !rest.is_empty() => "/tasks/{id}".to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_routes_collapse_to_a_placeholder() {
        assert_eq!(
            metric_route("/tasks/550e8400-e29b-41d4-a716-446655440000"),
            "/tasks/{id}"
        );
        assert_eq!(metric_route("/tasks/not-even-a-uuid"), "/tasks/{id}");
    }

    #[test]
    fn fixed_routes_pass_through() {
        assert_eq!(metric_route("/tasks"), "/tasks");
        assert_eq!(metric_route("/healthz"), "/healthz");
        assert_eq!(metric_route("/auth/me"), "/auth/me");
    }
}
