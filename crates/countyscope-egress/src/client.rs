//! Shared HTTP client utilities

use crate::{EgressError, Result, classify::UpstreamResponse, query::UpstreamQuery};
use countyscope_core::ApiKey;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds.
    /// `None` leaves the request unbounded; only per-request timeouts apply.
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: 10,
            user_agent: format!("CountyScope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(&config.user_agent);

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder
        .build()
        .map_err(|e| EgressError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Perform a single GET and buffer the response. No retries.
///
/// `bearer` is sent as `Authorization: Bearer <key>`; `timeout` overrides the
/// client-level timeout for this call only.
pub async fn send_get(
    client: &Client,
    query: &UpstreamQuery,
    bearer: Option<&ApiKey>,
    timeout: Option<Duration>,
) -> std::result::Result<UpstreamResponse, reqwest::Error> {
    debug!(url = %query.public_url(), "Sending upstream GET");

    let mut builder = client
        .get(query.url())
        .header("Accept", "application/json");

    if let Some(key) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", key.expose()));
    }
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    let response = builder.send().await?;
    debug!(status = %response.status(), "Upstream responded");

    UpstreamResponse::read(response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(config.user_agent.starts_with("CountyScope/"));
    }

    #[test]
    fn test_create_client() {
        let config = HttpClientConfig::default();
        let client = create_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_bounded_timeout() {
        let config = HttpClientConfig {
            timeout_secs: Some(30),
            connect_timeout_secs: 5,
            user_agent: "Test/1.0".to_string(),
        };

        let client = create_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_error_display_formatting() {
        let err = EgressError::ConfigError("bad config".to_string());
        assert!(err.to_string().contains("Invalid configuration"));
    }
}
