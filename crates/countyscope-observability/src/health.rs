//! Liveness, readiness and metrics routes
//!
//! - `/healthz` answers as long as the process serves requests
//! - `/readyz` reports each provider connector; 503 when any is unavailable
//! - `/metrics` exports the Prometheus registry in text format

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::metrics::Metrics;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liveness {
    pub status: String,
    pub version: String,
}

/// Connector summary shown by `/readyz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
    /// Endpoint kinds the connector accepts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<String>,
    /// Whether a server-side default key is configured
    pub default_key: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub status: String,
    #[serde(default)]
    pub providers: Vec<ProviderStatus>,
}

/// Source of provider statuses for `/readyz`
pub trait ReadinessChecker: Send + Sync {
    fn get_provider_statuses(&self) -> Vec<ProviderStatus>;

    fn is_ready(&self) -> bool {
        self.get_provider_statuses().iter().all(|p| p.available)
    }
}

#[derive(Clone)]
pub struct HealthState {
    metrics: Arc<Metrics>,
    readiness: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness: None,
        }
    }

    pub fn with_readiness(mut self, checker: Arc<dyn ReadinessChecker>) -> Self {
        self.readiness = Some(checker);
        self
    }

    fn report(&self) -> (bool, Vec<ProviderStatus>) {
        match &self.readiness {
            Some(checker) => (checker.is_ready(), checker.get_provider_statuses()),
            None => (true, Vec::new()),
        }
    }
}

pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(export_metrics))
        .with_state(state)
}

async fn healthz() -> Json<Liveness> {
    Json(Liveness {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn readyz(State(state): State<HealthState>) -> (StatusCode, Json<ReadinessReport>) {
    let (ready, providers) = state.report();
    let (code, status) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        code,
        Json(ReadinessReport {
            status: status.to_string(),
            providers,
        }),
    )
}

async fn export_metrics(State(state): State<HealthState>) -> Response {
    let families = state.metrics.registry().gather();

    match TextEncoder::new().encode_to_string(&families) {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": format!("Failed to encode metrics: {}", err),
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    struct FixedReadiness(Vec<ProviderStatus>);

    impl ReadinessChecker for FixedReadiness {
        fn get_provider_statuses(&self) -> Vec<ProviderStatus> {
            self.0.clone()
        }
    }

    fn provider(name: &str, available: bool) -> ProviderStatus {
        ProviderStatus {
            name: name.to_string(),
            available,
            endpoints: Vec::new(),
            default_key: false,
        }
    }

    fn state_with(providers: Vec<ProviderStatus>) -> HealthState {
        HealthState::new(Arc::new(Metrics::new().unwrap()))
            .with_readiness(Arc::new(FixedReadiness(providers)))
    }

    async fn get(state: HealthState, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = health_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_healthz_reports_version() {
        let (status, body) = get(state_with(vec![]), "/healthz").await;
        assert_eq!(status, StatusCode::OK);

        let body: Liveness = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_readyz_all_available() {
        let state = state_with(vec![provider("census", true), provider("hud", true)]);
        let (status, body) = get(state, "/readyz").await;
        assert_eq!(status, StatusCode::OK);

        let report: ReadinessReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.status, "ready");
        assert_eq!(report.providers.len(), 2);
    }

    #[tokio::test]
    async fn test_readyz_one_unavailable() {
        let state = state_with(vec![provider("census", true), provider("hud", false)]);
        let (status, body) = get(state, "/readyz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let report: ReadinessReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.status, "not_ready");
    }

    #[tokio::test]
    async fn test_readyz_without_checker() {
        let state = HealthState::new(Arc::new(Metrics::new().unwrap()));
        let (status, _) = get(state, "/readyz").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_text_format() {
        let metrics = Arc::new(Metrics::new().unwrap());
        metrics.record_request_success("census", "acs", 0.1);

        let (status, body) = get(HealthState::new(metrics), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            String::from_utf8(body)
                .unwrap()
                .contains("countyscope_requests_total")
        );
    }

    #[test]
    fn test_provider_status_omits_empty_endpoints() {
        let json = serde_json::to_value(provider("fred", true)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "fred", "available": true, "default_key": false})
        );
    }
}
