//! Router assembly for the server binary

use crate::config::ServerConfig;
use axum::Router;
use countyscope_ingress::{AppState, ProviderReadiness, routes, with_request_context};
use countyscope_observability::{HealthState, Metrics, health_router};
use std::sync::Arc;

/// Boundary routes, health routes and CORS for a loaded config
pub fn build_app(config: &ServerConfig) -> anyhow::Result<Router> {
    let providers = config.provider_set()?;
    let metrics = Arc::new(Metrics::new()?);

    let health = HealthState::new(metrics.clone())
        .with_readiness(Arc::new(ProviderReadiness::new(providers.clone())));
    let state = AppState::new(providers).with_metrics(metrics);

    let app = routes(state).merge(health_router(health));
    Ok(with_request_context(app).layer(config.cors.layer()))
}
