//! Shared ingress types and utilities

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use countyscope_core::{ApiError, ApiKey};
use serde_json::json;
use thiserror::Error;

/// Ingress error types
#[derive(Debug, Error)]
pub enum IngressError {
    /// Query string could not be decoded
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// Classified error from validation or an upstream call
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl IngressError {
    /// Every ingress failure is reported through the same taxonomy
    pub fn into_api_error(self) -> ApiError {
        match self {
            IngressError::InvalidQuery(msg) => {
                ApiError::invalid_request(format!("Invalid query string: {}", msg))
            }
            IngressError::Api(err) => err,
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let err = self.into_api_error();
        let status =
            StatusCode::from_u16(err.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let details = if err.detail.is_null() {
            json!({ "message": err.message })
        } else {
            err.detail
        };

        let body = json!({
            "error": err.message,
            "kind": err.kind,
            "details": details,
        });

        (status, Json(body)).into_response()
    }
}

/// Ingress result type
pub type IngressResult<T> = Result<T, IngressError>;

/// Decoded query parameters in their original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> IngressResult<Self> {
        match raw {
            None | Some("") => Ok(Self::default()),
            Some(raw) => serde_urlencoded::from_str(raw)
                .map(Self)
                .map_err(|e| IngressError::InvalidQuery(e.to_string())),
        }
    }

    /// First non-empty value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// All pairs except those named in `skip`
    pub fn without(&self, skip: &[&str]) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(k, _)| !skip.contains(&k.as_str()))
            .cloned()
            .collect()
    }

    /// `api_key` (or the Census-style `key`) as a credential
    pub fn api_key(&self) -> Option<ApiKey> {
        self.get("api_key").or_else(|| self.get("key")).map(ApiKey::new)
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = IngressError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        QueryParams::parse(parts.uri.query())
    }
}
