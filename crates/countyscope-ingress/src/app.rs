//! Application state and router assembly

use crate::{census, demo, fred, hud, middleware};
use axum::{Router, extract::Request, middleware::from_fn};
use countyscope_core::{ApiError, DataRequest, NormalizedRecord, ProviderKind};
use countyscope_egress::ProviderSet;
use countyscope_observability::{Metrics, ProviderStatus, ReadinessChecker};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{Span, debug_span, info, warn};

/// Metric label shared by every endpoint kind a connector does not list
pub const OTHER_ENDPOINT_LABEL: &str = "other";

/// State shared by every boundary handler
#[derive(Clone)]
pub struct AppState {
    pub providers: ProviderSet,
    pub metrics: Option<Arc<Metrics>>,
}

impl AppState {
    pub fn new(providers: ProviderSet) -> Self {
        Self {
            providers,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Endpoint label for metrics, bounded by the connector's endpoint kinds
    pub fn endpoint_label(&self, provider: ProviderKind, kind: &str) -> &'static str {
        self.providers
            .get(provider)
            .endpoint_kinds()
            .into_iter()
            .find(|known| *known == kind)
            .unwrap_or(OTHER_ENDPOINT_LABEL)
    }

    /// Dispatch a request and record its outcome
    pub async fn fetch(&self, request: DataRequest) -> Result<NormalizedRecord, ApiError> {
        let provider = request.provider;
        let endpoint = request.endpoint_kind.clone();
        let label = self.endpoint_label(provider, &endpoint);
        let start = Instant::now();

        let result = self.providers.dispatch(request).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                info!(
                    %provider,
                    %endpoint,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Upstream request succeeded"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_request_success(
                        provider.as_str(),
                        label,
                        elapsed.as_secs_f64(),
                    );
                }
            }
            Err(err) => {
                warn!(
                    %provider,
                    %endpoint,
                    kind = err.kind().as_str(),
                    status = err.http_status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Upstream request failed: {}",
                    err.message
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_request_failure(
                        provider.as_str(),
                        label,
                        err.kind().as_str(),
                        elapsed.as_secs_f64(),
                    );
                }
            }
        }

        result
    }
}

/// Boundary routes without request-level layers
pub fn routes(state: AppState) -> Router {
    Router::new()
        .merge(census::router())
        .merge(fred::router())
        .merge(hud::router())
        .merge(demo::router())
        .with_state(state)
}

/// Boundary routes with request-id and trace layers
pub fn router(state: AppState) -> Router {
    with_request_context(routes(state))
}

/// Request-id and trace layers for a fully merged router
pub fn with_request_context(app: Router) -> Router {
    app.layer(from_fn(middleware::request_context_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

// Path only: query strings may carry API keys
fn request_span(req: &Request) -> Span {
    debug_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        version = ?req.version(),
    )
}

/// Readiness derived from the configured connectors
#[derive(Clone)]
pub struct ProviderReadiness {
    providers: ProviderSet,
}

impl ProviderReadiness {
    pub fn new(providers: ProviderSet) -> Self {
        Self { providers }
    }
}

impl ReadinessChecker for ProviderReadiness {
    fn get_provider_statuses(&self) -> Vec<ProviderStatus> {
        ProviderKind::ALL
            .iter()
            .map(|&kind| ProviderStatus {
                name: kind.as_str().to_string(),
                // Keys are checked per request, not here
                available: true,
                endpoints: self
                    .providers
                    .get(kind)
                    .endpoint_kinds()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                default_key: self.providers.has_default_key(kind),
            })
            .collect()
    }
}
