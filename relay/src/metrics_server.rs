//! HTTP server for Prometheus metrics and health
//!
//! # Endpoints
//!
//! - `GET /metrics` - Prometheus metrics
//! - `GET /health` - JSON status of the feed connection, sink and delivery record
//!
//! # Example
//!
//! ```ignore
//! use disaster_relay::metrics_server::MetricsServer;
//!
//! let record = engine.record();
//! let handle = MetricsServer::start("0.0.0.0:9090".parse()?, record, sink);
//! ```

use crate::dedup::DeliveryRecord;
use crate::metrics::Metrics;
use axum::extract::State;
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use disaster_relay_core::Sink;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shared state for the metrics server
#[derive(Clone)]
struct AppState {
    record: Arc<DeliveryRecord>,
    sink: Arc<dyn Sink>,
}

/// Metrics HTTP server
pub struct MetricsServer;

impl MetricsServer {
    /// Start the metrics server on `addr`
    ///
    /// Returns a JoinHandle that can be used to abort the server.
    /// The server runs until aborted or the process exits.
    pub fn start(
        addr: SocketAddr,
        record: Arc<DeliveryRecord>,
        sink: Arc<dyn Sink>,
    ) -> JoinHandle<()> {
        let app = router(record, sink);

        tokio::spawn(async move {
            info!(addr = %addr, "Metrics server starting");

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    error!(error = %e, addr = %addr, "Failed to bind metrics server");
                    return;
                }
            };

            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "Metrics server error");
            }
        })
    }
}

fn router(record: Arc<DeliveryRecord>, sink: Arc<dyn Sink>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { record, sink })
}

/// Handler for /metrics endpoint
async fn metrics_handler() -> impl IntoResponse {
    let body = crate::metrics::gather();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

#[derive(serde::Serialize)]
struct HealthSummary {
    status: &'static str,
    stream_connected: bool,
    consecutive_failures: u64,
    sink: &'static str,
    sink_healthy: bool,
    delivered_ids: usize,
}

/// Handler for /health endpoint
///
/// `degraded` while the sink reports unhealthy, or while the stream is down
/// and at least one attempt in a row has failed without data. Always 200:
/// the process is alive and retrying.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (stream_connected, consecutive_failures) = match Metrics::get() {
        Some(m) => (
            m.stream_connected.get() >= 1.0,
            m.consecutive_failures.get().max(0.0) as u64,
        ),
        None => (false, 0),
    };

    let sink_healthy = state.sink.health().await;

    let status = if !sink_healthy || (!stream_connected && consecutive_failures > 0) {
        "degraded"
    } else {
        "ok"
    };

    let summary = HealthSummary {
        status,
        stream_connected,
        consecutive_failures,
        sink: state.sink.name(),
        sink_healthy,
        delivered_ids: state.record.len(),
    };

    (StatusCode::OK, Json(summary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use disaster_relay_core::{Event, SinkError};

    struct FixedHealthSink(bool);

    #[async_trait]
    impl Sink for FixedHealthSink {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn deliver(&self, _event: &Event) -> Result<(), SinkError> {
            Ok(())
        }

        async fn health(&self) -> bool {
            self.0
        }
    }

    async fn health_json(record: Arc<DeliveryRecord>, sink: Arc<dyn Sink>) -> serde_json::Value {
        let response = health_handler(State(AppState { record, sink }))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 10_000)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_handler_returns_prometheus_format() {
        let _ = Metrics::init();

        let response = metrics_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.contains("text/plain"));
    }

    #[tokio::test]
    async fn test_health_reports_record_size() {
        let record = Arc::new(DeliveryRecord::new());
        record.mark_delivered("a");
        record.mark_delivered("b");

        let json = health_json(record, Arc::new(FixedHealthSink(true))).await;

        assert!(json["status"].is_string());
        assert!(json["stream_connected"].is_boolean());
        assert!(json["consecutive_failures"].is_number());
        assert_eq!(json["sink"], "fixed");
        assert_eq!(json["sink_healthy"], true);
        assert_eq!(json["delivered_ids"], 2);
    }

    #[tokio::test]
    async fn test_unhealthy_sink_degrades_status() {
        let json = health_json(
            Arc::new(DeliveryRecord::new()),
            Arc::new(FixedHealthSink(false)),
        )
        .await;

        assert_eq!(json["sink_healthy"], false);
        assert_eq!(json["status"], "degraded");
    }

    #[tokio::test]
    async fn test_server_serves_both_routes() {
        let _ = Metrics::init();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::new(DeliveryRecord::new()), Arc::new(FixedHealthSink(true)));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let client = reqwest::Client::new();
        let metrics = client
            .get(format!("http://{addr}/metrics"))
            .send()
            .await
            .unwrap();
        assert!(metrics.status().is_success());

        let health: serde_json::Value = client
            .get(format!("http://{addr}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["delivered_ids"], 0);

        server.abort();
    }
}
