//! Common test utilities for integration tests

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use countyscope_egress::{
    ProviderSet, census::CensusConfig, fred::FredConfig, hud::HudConfig,
};
use countyscope_ingress::{AppState, ProviderReadiness, routes, with_request_context};
use countyscope_observability::{HealthState, Metrics, health_router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::MockServer;

pub const HUD_KEY: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9.integration";

/// Connectors pointed at one mock server, one path prefix per provider
#[allow(dead_code)]
pub fn mock_providers(server: &MockServer) -> ProviderSet {
    ProviderSet::from_configs(
        CensusConfig::default().with_base_url(format!("{}/data", server.uri())),
        FredConfig::default().with_base_url(format!("{}/fred", server.uri())),
        HudConfig::default()
            .with_base_url(format!("{}/hudapi/public", server.uri()))
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap()
}

/// Full application: boundary routes plus health and metrics
#[allow(dead_code)]
pub fn full_app(providers: ProviderSet) -> (Router, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().unwrap());
    let health = HealthState::new(metrics.clone())
        .with_readiness(Arc::new(ProviderReadiness::new(providers.clone())));
    let app = with_request_context(
        routes(AppState::new(providers).with_metrics(metrics.clone()))
            .merge(health_router(health)),
    );
    (app, metrics)
}

#[allow(dead_code)]
pub async fn get_raw(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[allow(dead_code)]
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = get_raw(app, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}
