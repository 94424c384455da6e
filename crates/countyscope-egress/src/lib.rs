//! CountyScope Egress Connectors
//!
//! This crate provides connectors to the upstream statistics providers:
//! - Census Bureau (American Community Survey)
//! - FRED (Federal Reserve Economic Data)
//! - HUD User
//!
//! Each connector builds the provider-specific query, performs exactly one
//! GET, classifies the outcome, and normalizes the body.

pub mod census;
pub mod classify;
pub mod client;
pub mod fred;
pub mod hud;
pub mod providers;
pub mod query;

use countyscope_core::ApiError;
use thiserror::Error;

pub use providers::ProviderSet;

/// Egress-side errors raised while building or driving the HTTP client
#[derive(Debug, Error)]
pub enum EgressError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl From<EgressError> for ApiError {
    fn from(err: EgressError) -> Self {
        match err {
            EgressError::ConfigError(msg) => ApiError::unknown(500, msg),
            EgressError::HttpError(e) => {
                ApiError::upstream_unavailable(500, e.without_url().to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EgressError>;
