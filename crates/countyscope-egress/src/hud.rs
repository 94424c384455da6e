//! HUD User egress connector

use crate::{
    Result,
    classify::Classifier,
    client::{HttpClientConfig, create_client, send_get},
    query::UpstreamQuery,
};
use async_trait::async_trait;
use countyscope_core::{
    ApiError, ApiKey, DataRequest, NormalizedRecord, ProviderKind, RecordData,
    provider::Upstream,
};
use reqwest::Client;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// HUD tokens are long JWTs; anything shorter is certainly not one
pub const MIN_API_KEY_LEN: usize = 20;

/// Per-request timeout for HUD calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The four supported HUD datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HudEndpoint {
    FairMarketRents,
    IncomeLimits,
    AssistedHousing,
    Homelessness,
}

impl HudEndpoint {
    pub const ALL: [HudEndpoint; 4] = [
        HudEndpoint::FairMarketRents,
        HudEndpoint::IncomeLimits,
        HudEndpoint::AssistedHousing,
        HudEndpoint::Homelessness,
    ];

    /// Name accepted at the boundary
    pub fn kind(&self) -> &'static str {
        match self {
            HudEndpoint::FairMarketRents => "fair-market-rents",
            HudEndpoint::IncomeLimits => "income-limits",
            HudEndpoint::AssistedHousing => "assisted-housing",
            HudEndpoint::Homelessness => "homelessness",
        }
    }

    /// Upstream path segment
    pub fn path(&self) -> &'static str {
        match self {
            HudEndpoint::FairMarketRents => "fmr",
            HudEndpoint::IncomeLimits => "il",
            HudEndpoint::AssistedHousing => "picture",
            HudEndpoint::Homelessness => "ahar",
        }
    }
}

impl FromStr for HudEndpoint {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HudEndpoint::ALL
            .into_iter()
            .find(|e| e.kind() == s)
            .ok_or_else(|| {
                ApiError::invalid_request(format!("Invalid HUD endpoint: {}", s)).with_detail(
                    json!({
                        "supported": HudEndpoint::ALL.map(|e| e.kind()),
                    }),
                )
            })
    }
}

/// HUD connector configuration
#[derive(Debug, Clone)]
pub struct HudConfig {
    /// Base URL (default: https://www.huduser.gov/hudapi/public)
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.huduser.gov/hudapi/public".to_string(),
            timeout: REQUEST_TIMEOUT,
            client_config: HttpClientConfig::default(),
        }
    }
}

impl HudConfig {
    /// Set the base URL (for custom endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Reject absent or too-short keys before any network call
pub fn validate_key(key: Option<&ApiKey>) -> std::result::Result<&ApiKey, ApiError> {
    let provided = key.map(ApiKey::len).unwrap_or(0);
    match key {
        Some(key) if provided >= MIN_API_KEY_LEN => Ok(key),
        _ => Err(
            ApiError::missing_credentials("Invalid or missing HUD API key").with_detail(json!({
                "message": format!(
                    "HUD API key must be at least {} characters",
                    MIN_API_KEY_LEN
                ),
                "providedLength": provided,
            })),
        ),
    }
}

/// Two-character state abbreviation or FIPS code
fn is_state_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Build the HUD query for a request
pub fn to_hud_query(
    request: &DataRequest,
    config: &HudConfig,
) -> std::result::Result<UpstreamQuery, ApiError> {
    let endpoint = HudEndpoint::from_str(&request.endpoint_kind)?;
    let region = request
        .region
        .as_ref()
        .filter(|r| !r.state_code.is_empty())
        .ok_or_else(|| ApiError::invalid_request("HUD requests require a state"))?;
    if !is_state_code(&region.state_code) {
        return Err(ApiError::invalid_request(format!(
            "Invalid HUD state: '{}'",
            region.state_code
        )));
    }

    let query = UpstreamQuery::at(
        &config.base_url,
        &format!("{}/statedata/{}", endpoint.path(), region.state_code),
    );

    Ok(match request.period() {
        Some(year) => query.param("year", year),
        None => query,
    })
}

/// Unwrap the top-level `data` field when HUD provides one
pub fn from_hud_response(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

/// HUD connector
pub struct HudConnector {
    config: HudConfig,
    client: Client,
    classifier: Classifier,
}

impl HudConnector {
    /// Create a new HUD connector
    pub fn new(config: HudConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            classifier: Classifier::new(ProviderKind::Hud),
        })
    }

    pub fn config(&self) -> &HudConfig {
        &self.config
    }
}

#[async_trait]
impl Upstream for HudConnector {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Hud
    }

    #[instrument(skip(self, request), fields(endpoint = %request.endpoint_kind))]
    async fn fetch(&self, request: DataRequest) -> countyscope_core::Result<NormalizedRecord> {
        let key = validate_key(request.credentials.as_ref()).inspect_err(|_| {
            warn!("Rejecting HUD request: API key missing or too short");
        })?;
        let query = to_hud_query(&request, &self.config)?;
        debug!(url = %query.public_url(), "Fetching HUD data");

        let response = send_get(&self.client, &query, Some(key), Some(self.config.timeout))
            .await
            .map_err(|e| self.classifier.transport(e))?;
        let response = self.classifier.check(response)?;
        let body: serde_json::Value = self.classifier.parse(&response)?;

        Ok(NormalizedRecord::new(
            ProviderKind::Hud,
            query.public_url(),
            RecordData::Raw(from_hud_response(body)),
        )
        .with_region(request.region.clone())
        .with_period(request.period().map(str::to_string)))
    }

    fn endpoint_kinds(&self) -> Vec<&'static str> {
        HudEndpoint::ALL.iter().map(HudEndpoint::kind).collect()
    }
}
