//! Metrics collection with Prometheus
//!
//! - Boundary request counts by provider and endpoint kind
//! - Failure counts by provider and error kind
//! - Upstream latency histograms by provider

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for CountyScope
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Total proxied requests
    pub requests_total: CounterVec,
    /// Failed requests by error kind
    pub requests_failure: CounterVec,
    /// Time spent inside the connector (validation + upstream call + normalization)
    pub upstream_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("countyscope_requests_total", "Total number of proxied requests"),
            &["provider", "endpoint"],
        )?;

        let requests_failure = CounterVec::new(
            Opts::new(
                "countyscope_requests_failure_total",
                "Total number of failed proxied requests",
            ),
            &["provider", "endpoint", "kind"],
        )?;

        let upstream_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "countyscope_upstream_duration_seconds",
                "Upstream request duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0]),
            &["provider"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(requests_failure.clone()))?;
        registry.register(Box::new(upstream_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            requests_failure,
            upstream_duration_seconds,
        })
    }

    /// Get the Prometheus registry for exporting metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a successful request
    pub fn record_request_success(&self, provider: &str, endpoint: &str, duration_secs: f64) {
        self.requests_total
            .with_label_values(&[provider, endpoint])
            .inc();
        self.upstream_duration_seconds
            .with_label_values(&[provider])
            .observe(duration_secs);
    }

    /// Record a failed request
    pub fn record_request_failure(
        &self,
        provider: &str,
        endpoint: &str,
        kind: &str,
        duration_secs: f64,
    ) {
        self.requests_total
            .with_label_values(&[provider, endpoint])
            .inc();
        self.requests_failure
            .with_label_values(&[provider, endpoint, kind])
            .inc();
        self.upstream_duration_seconds
            .with_label_values(&[provider])
            .observe(duration_secs);
    }
}
