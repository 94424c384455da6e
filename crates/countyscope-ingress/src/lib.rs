//! CountyScope Ingress
//!
//! This crate provides the HTTP boundary used by the dashboard:
//! - `/census-proxy` (values, `/states`, `/counties`)
//! - `/fred-proxy`
//! - `/hud-proxy`
//! - `/chart-data` (static demo series)

pub mod app;
pub mod census;
pub mod demo;
pub mod fred;
pub mod hud;
pub mod middleware;
pub mod types;

pub use app::{AppState, ProviderReadiness, router, routes, with_request_context};
pub use middleware::CorsConfig;
pub use types::{IngressError, IngressResult, QueryParams};
