//! Error types for CountyScope Core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of failure kinds surfaced to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unsupported provider, endpoint kind, or malformed parameters
    InvalidRequest,
    /// Credential absent or failing local validation
    MissingCredentials,
    /// No response from upstream (DNS, TLS, connect, timeout)
    UpstreamUnavailable,
    /// Upstream answered with a non-2xx status
    UpstreamRejected,
    /// Upstream answered 2xx with a body of unexpected shape
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::MissingCredentials => "MissingCredentials",
            ErrorKind::UpstreamUnavailable => "UpstreamUnavailable",
            ErrorKind::UpstreamRejected => "UpstreamRejected",
            ErrorKind::Unknown => "Unknown",
        }
    }

    /// Local validation failures never reach the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidRequest | ErrorKind::MissingCredentials
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified error returned across the service boundary.
///
/// `http_status` is the status the boundary response must carry, and
/// `detail` is an opaque diagnostic payload (for rejections, the upstream
/// status, headers, and body verbatim).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub http_status: u16,
    pub message: String,
    pub detail: serde_json::Value,
}

impl ApiError {
    pub fn new(kind: ErrorKind, http_status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status,
            message: message.into(),
            detail: serde_json::Value::Null,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, 400, message)
    }

    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingCredentials, 400, message)
    }

    pub fn upstream_unavailable(http_status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, http_status, message)
    }

    /// Rejection keeps the upstream status so a 503 is never flattened to 500
    pub fn upstream_rejected(upstream_status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamRejected, upstream_status, message)
    }

    pub fn unknown(http_status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, http_status, message)
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
