//! Provider-agnostic data requests

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three upstream data providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Census,
    Fred,
    Hud,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Census, ProviderKind::Fred, ProviderKind::Hud];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Census => "census",
            ProviderKind::Fred => "fred",
            ProviderKind::Hud => "hud",
        }
    }

    /// Boundary status for transport failures and unparseable success bodies.
    /// HUD reports gateway errors; Census and FRED report 500.
    pub fn failure_status(&self) -> u16 {
        match self {
            ProviderKind::Census | ProviderKind::Fred => 500,
            ProviderKind::Hud => 502,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "census" => Ok(ProviderKind::Census),
            "fred" => Ok(ProviderKind::Fred),
            "hud" => Ok(ProviderKind::Hud),
            other => Err(ApiError::invalid_request(format!(
                "Unknown provider '{}'",
                other
            ))),
        }
    }
}

/// State (and optionally county) FIPS codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub state_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county_code: Option<String>,
}

impl Region {
    pub fn state(state_code: impl Into<String>) -> Self {
        Self {
            state_code: state_code.into(),
            county_code: None,
        }
    }

    pub fn county(state_code: impl Into<String>, county_code: impl Into<String>) -> Self {
        Self {
            state_code: state_code.into(),
            county_code: Some(county_code.into()),
        }
    }
}

/// Opaque provider credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for placing on the outbound request only
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<{} chars>)", self.len())
    }
}

/// A provider-agnostic request for statistics.
///
/// `provider` decides which fields are meaningful: Census reads `variables`
/// and `region`, FRED forwards `params` verbatim, HUD reads `region` and the
/// first entry of `time_range`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub provider: ProviderKind,
    pub endpoint_kind: String,
    pub region: Option<Region>,
    pub time_range: Vec<String>,
    pub variables: Vec<String>,
    pub params: Vec<(String, String)>,
    pub credentials: Option<ApiKey>,
}

impl DataRequest {
    pub fn new(provider: ProviderKind, endpoint_kind: impl Into<String>) -> Self {
        Self {
            provider,
            endpoint_kind: endpoint_kind.into(),
            region: None,
            time_range: Vec::new(),
            variables: Vec::new(),
            params: Vec::new(),
            credentials: None,
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.time_range.push(period.into());
        self
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables.extend(variables.into_iter().map(Into::into));
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_credentials(mut self, key: ApiKey) -> Self {
        self.credentials = Some(key);
        self
    }

    /// Fill in a credential only when the request carries none
    pub fn or_credentials(mut self, fallback: Option<&ApiKey>) -> Self {
        if self.credentials.is_none() {
            self.credentials = fallback.cloned();
        }
        self
    }

    /// First period of the time range, if any
    pub fn period(&self) -> Option<&str> {
        self.time_range.first().map(String::as_str)
    }

    /// First value of a pass-through parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests;
