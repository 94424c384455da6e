//! Normalized record types
//!
//! Every provider response is mapped into a `NormalizedRecord` so the
//! dashboard renders Census, FRED, and HUD data without special-casing
//! provider JSON shapes.

use crate::request::{ProviderKind, Region};
use serde::{Deserialize, Serialize};

/// One `{name, id}` row of a state or county listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    pub id: String,
}

impl RegionEntry {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Payload of a normalized record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordData {
    /// Variable name to value, in upstream header order
    Values(serde_json::Map<String, serde_json::Value>),
    /// Listing of regions
    Regions(Vec<RegionEntry>),
    /// Self-describing upstream JSON relayed unchanged
    Raw(serde_json::Value),
}

/// The single internal shape consumed by all renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub provider: ProviderKind,
    /// Upstream URL that produced the data, without credentials
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub data: RecordData,
}

impl NormalizedRecord {
    pub fn new(provider: ProviderKind, endpoint: impl Into<String>, data: RecordData) -> Self {
        Self {
            provider,
            endpoint: endpoint.into(),
            region: None,
            period: None,
            data,
        }
    }

    pub fn with_region(mut self, region: Option<Region>) -> Self {
        self.region = region;
        self
    }

    pub fn with_period(mut self, period: Option<String>) -> Self {
        self.period = period;
        self
    }

    /// Look up a variable in a `Values` record
    pub fn value(&self, variable: &str) -> Option<&serde_json::Value> {
        match &self.data {
            RecordData::Values(map) => map.get(variable),
            _ => None,
        }
    }

    /// The payload as plain JSON
    pub fn data_json(&self) -> serde_json::Value {
        match &self.data {
            RecordData::Values(map) => serde_json::Value::Object(map.clone()),
            RecordData::Regions(entries) => serde_json::Value::Array(
                entries
                    .iter()
                    .map(|e| serde_json::json!({ "name": e.name, "id": e.id }))
                    .collect(),
            ),
            RecordData::Raw(value) => value.clone(),
        }
    }
}
