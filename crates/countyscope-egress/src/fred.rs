//! FRED egress connector
//!
//! FRED already returns self-describing JSON, so this connector forwards the
//! caller's query parameters verbatim and relays the body unchanged.

use crate::{
    Result,
    classify::Classifier,
    client::{HttpClientConfig, create_client, send_get},
    query::UpstreamQuery,
};
use async_trait::async_trait;
use countyscope_core::{
    ApiError, DataRequest, NormalizedRecord, ProviderKind, RecordData, provider::Upstream,
};
use reqwest::Client;
use tracing::{debug, instrument};

/// Endpoint used when the request names none
pub const DEFAULT_ENDPOINT: &str = "series";

/// Internal selector parameter, never forwarded
pub const ENDPOINT_PARAM: &str = "endpoint";

const API_KEY_PARAM: &str = "api_key";

/// FRED connector configuration
#[derive(Debug, Clone)]
pub struct FredConfig {
    /// Base URL (default: https://api.stlouisfed.org/fred)
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl Default for FredConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stlouisfed.org/fred".to_string(),
            client_config: HttpClientConfig::default(),
        }
    }
}

impl FredConfig {
    /// Set the base URL (for custom endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// FRED paths are lowercase words joined by `/` (e.g. `series/observations`)
fn is_endpoint_path(kind: &str) -> bool {
    kind.split('/').all(|segment| {
        !segment.is_empty() && segment.chars().all(|c| c.is_ascii_lowercase() || c == '_')
    })
}

/// Build the FRED query for a request
pub fn to_fred_query(
    request: &DataRequest,
    config: &FredConfig,
) -> std::result::Result<UpstreamQuery, ApiError> {
    let kind = match request.endpoint_kind.as_str() {
        "" => DEFAULT_ENDPOINT,
        kind => kind,
    };
    if !is_endpoint_path(kind) {
        return Err(ApiError::invalid_request(format!(
            "Invalid FRED endpoint: {}",
            kind
        )));
    }

    let mut query = UpstreamQuery::at(&config.base_url, kind).credential_param(API_KEY_PARAM);
    for (name, value) in request.params.iter().filter(|(k, _)| k != ENDPOINT_PARAM) {
        query = query.param(name.as_str(), value.as_str());
    }

    if query.get(API_KEY_PARAM).is_none()
        && let Some(key) = request.credentials.as_ref().filter(|k| !k.is_empty())
    {
        query = query.param(API_KEY_PARAM, key.expose());
    }

    Ok(query)
}

/// FRED connector
pub struct FredConnector {
    config: FredConfig,
    client: Client,
    classifier: Classifier,
}

impl FredConnector {
    /// Create a new FRED connector
    pub fn new(config: FredConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            classifier: Classifier::new(ProviderKind::Fred),
        })
    }

    pub fn config(&self) -> &FredConfig {
        &self.config
    }
}

#[async_trait]
impl Upstream for FredConnector {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fred
    }

    #[instrument(skip(self, request), fields(endpoint = %request.endpoint_kind))]
    async fn fetch(&self, request: DataRequest) -> countyscope_core::Result<NormalizedRecord> {
        let query = to_fred_query(&request, &self.config)?;
        debug!(url = %query.public_url(), "Fetching FRED data");

        let response = send_get(&self.client, &query, None, None)
            .await
            .map_err(|e| self.classifier.transport(e))?;
        let response = self.classifier.check(response)?;
        let body: serde_json::Value = self.classifier.parse(&response)?;

        Ok(
            NormalizedRecord::new(ProviderKind::Fred, query.public_url(), RecordData::Raw(body))
                .with_period(request.period().map(str::to_string)),
        )
    }

    fn endpoint_kinds(&self) -> Vec<&'static str> {
        vec![
            "series",
            "series/observations",
            "series/search",
            "category",
            "releases",
        ]
    }
}
