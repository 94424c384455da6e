//! Upstream outcome classification
//!
//! | Outcome                       | Kind                | Status                    |
//! |-------------------------------|---------------------|---------------------------|
//! | no response (DNS/TLS/timeout) | UpstreamUnavailable | provider failure status   |
//! | non-2xx                       | UpstreamRejected    | upstream status, verbatim |
//! | 2xx, body of unexpected shape | Unknown             | provider failure status   |

use countyscope_core::{ApiError, ProviderKind};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

/// Raw upstream response, buffered and uninterpreted
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Buffer a reqwest response without reshaping it
    pub async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

// No response arrived, so every lastResponse field is null
fn unavailable_detail(message: &str, timeout: bool, connect: bool) -> serde_json::Value {
    json!({
        "lastResponseStatus": null,
        "lastResponseStatusText": null,
        "lastResponseText": null,
        "lastResponseHeaders": null,
        "message": message,
        "timeout": timeout,
        "connect": connect,
    })
}

fn header_map(headers: &[(String, String)]) -> serde_json::Map<String, serde_json::Value> {
    headers
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect()
}

/// Maps adapter outcomes for one provider to `ApiError`
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    provider: ProviderKind,
}

impl Classifier {
    pub fn new(provider: ProviderKind) -> Self {
        Self { provider }
    }

    fn label(&self) -> &'static str {
        match self.provider {
            ProviderKind::Census => "Census",
            ProviderKind::Fred => "FRED",
            ProviderKind::Hud => "HUD",
        }
    }

    /// Transport failure: nothing came back from upstream
    pub fn transport(&self, err: reqwest::Error) -> ApiError {
        let err = err.without_url();
        let message = format!("Failed to reach {} API: {}", self.label(), err);
        warn!(provider = %self.provider, timeout = err.is_timeout(), "{}", message);

        ApiError::upstream_unavailable(self.provider.failure_status(), message.clone())
            .with_detail(unavailable_detail(&message, err.is_timeout(), err.is_connect()))
    }

    /// Pass 2xx responses through; classify everything else as a rejection
    pub fn check(&self, response: UpstreamResponse) -> Result<UpstreamResponse, ApiError> {
        if response.is_success() {
            return Ok(response);
        }

        let message = format!(
            "{} API error: {} {}",
            self.label(),
            response.status,
            response.status_text
        );
        warn!(provider = %self.provider, status = response.status, "{}", message);

        Err(
            ApiError::upstream_rejected(response.status, message.clone()).with_detail(json!({
                "lastResponseStatus": response.status,
                "lastResponseStatusText": response.status_text,
                "lastResponseText": response.body,
                "lastResponseHeaders": header_map(&response.headers),
                "message": message,
            })),
        )
    }

    /// Decode a 2xx body; an unexpected shape is `Unknown`, never partial data
    pub fn parse<T: DeserializeOwned>(&self, response: &UpstreamResponse) -> Result<T, ApiError> {
        serde_json::from_str(&response.body).map_err(|e| self.unexpected(e.to_string(), response))
    }

    /// Body decoded but did not have the structure the normalizer needs
    pub fn unexpected(&self, reason: impl Into<String>, response: &UpstreamResponse) -> ApiError {
        let reason = reason.into();
        let message = format!("Unexpected {} response: {}", self.label(), reason);
        warn!(provider = %self.provider, "{}", message);

        ApiError::unknown(self.provider.failure_status(), message.clone()).with_detail(json!({
            "lastResponseStatus": response.status,
            "lastResponseStatusText": response.status_text,
            "lastResponseText": response.body,
            "lastResponseHeaders": header_map(&response.headers),
            "message": message,
        }))
    }
}
