//! HTTP routes for the metrics endpoint.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use stratus_metrics::MetricsRegistry;

use super::TRACING_TARGET_SERVER;

/// Content type of the Prometheus text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Builds the metrics endpoint router.
pub fn router(registry: Arc<MetricsRegistry>) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/health", get(get_health))
        .with_state(registry)
}

/// Serves the current metrics in the text exposition format.
async fn get_metrics(State(registry): State<Arc<MetricsRegistry>>) -> Response {
    match stratus_metrics::render(&registry) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER,
                error = %error,
                "failed to render metrics"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Liveness probe.
async fn get_health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn metrics_endpoint_serves_exposition_format() {
        let registry = Arc::new(MetricsRegistry::new());
        registry.increment_success();
        registry.increment_success();
        registry.increment_failure();
        registry.record_latency(0.25).unwrap();

        let server = TestServer::new(router(registry)).unwrap();
        let response = server.get("/metrics").await;

        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("storage_operation_successes_total 2"));
        assert!(body.contains("storage_operation_failures_total 1"));
        assert!(body.contains("storage_operation_latency_seconds_count 1"));
    }

    #[tokio::test]
    async fn metrics_endpoint_sets_exposition_content_type() {
        let registry = Arc::new(MetricsRegistry::new());

        let server = TestServer::new(router(registry)).unwrap();
        let response = server.get("/metrics").await;

        response.assert_status_ok();
        let content_type = response.header(header::CONTENT_TYPE);
        assert_eq!(content_type.to_str().unwrap(), EXPOSITION_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn scrapes_are_idempotent_without_new_operations() {
        let registry = Arc::new(MetricsRegistry::new());
        registry.increment_success();

        let server = TestServer::new(router(registry)).unwrap();
        let first = server.get("/metrics").await.text();
        let second = server.get("/metrics").await.text();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn health_endpoint_responds_ok() {
        let registry = Arc::new(MetricsRegistry::new());

        let server = TestServer::new(router(registry)).unwrap();
        let response = server.get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.text(), "ok");
    }
}
