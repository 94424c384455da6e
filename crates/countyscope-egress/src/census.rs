//! Census Bureau egress connector

use crate::{
    Result,
    classify::Classifier,
    client::{HttpClientConfig, create_client, send_get},
    query::UpstreamQuery,
};
use async_trait::async_trait;
use countyscope_core::{
    ApiError, DataRequest, NormalizedRecord, ProviderKind, RecordData, RegionEntry,
    provider::Upstream,
};
use reqwest::Client;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Dataset used for `year >= from_year`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRule {
    pub from_year: u16,
    pub dataset: String,
}

/// Year-driven dataset selection.
///
/// The highest `from_year` not after the requested year wins; with no
/// matching rule the default dataset is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSelector {
    pub default_dataset: String,
    pub rules: Vec<DatasetRule>,
}

impl Default for DatasetSelector {
    fn default() -> Self {
        Self {
            default_dataset: "acs/acs5".to_string(),
            rules: Vec::new(),
        }
    }
}

impl DatasetSelector {
    pub fn select(&self, year: u16) -> &str {
        self.rules
            .iter()
            .filter(|rule| rule.from_year <= year)
            .max_by_key(|rule| rule.from_year)
            .map(|rule| rule.dataset.as_str())
            .unwrap_or(self.default_dataset.as_str())
    }
}

/// Census connector configuration
#[derive(Debug, Clone)]
pub struct CensusConfig {
    /// Base URL (default: https://api.census.gov/data)
    pub base_url: String,

    /// Dataset path selection by year
    pub datasets: DatasetSelector,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.census.gov/data".to_string(),
            datasets: DatasetSelector::default(),
            client_config: HttpClientConfig::default(),
        }
    }
}

impl CensusConfig {
    /// Set the base URL (for custom endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_datasets(mut self, datasets: DatasetSelector) -> Self {
        self.datasets = datasets;
        self
    }
}

/// What a Census request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CensusEndpoint {
    /// Variables for one region
    Values,
    /// All states
    States,
    /// All counties of one state
    Counties,
}

impl CensusEndpoint {
    pub const KINDS: [&'static str; 3] = ["acs", "states", "counties"];
}

impl FromStr for CensusEndpoint {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" | "acs" => Ok(CensusEndpoint::Values),
            "states" => Ok(CensusEndpoint::States),
            "counties" => Ok(CensusEndpoint::Counties),
            other => Err(ApiError::invalid_request(format!(
                "Invalid Census endpoint: {}",
                other
            ))),
        }
    }
}

fn parse_year(request: &DataRequest) -> std::result::Result<u16, ApiError> {
    let year = request
        .period()
        .ok_or_else(|| ApiError::invalid_request("Census requests require a year"))?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::invalid_request(format!("Invalid year: {}", year)));
    }
    year.parse::<u16>()
        .map_err(|_| ApiError::invalid_request(format!("Invalid year: {}", year)))
}

fn is_variable_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Build the Census query for a request
pub fn to_census_query(
    request: &DataRequest,
    config: &CensusConfig,
) -> std::result::Result<UpstreamQuery, ApiError> {
    let endpoint = CensusEndpoint::from_str(&request.endpoint_kind)?;
    let year = parse_year(request)?;
    let dataset = config.datasets.select(year);

    let query = UpstreamQuery::at(&config.base_url, &format!("{}/{}", year, dataset));

    let query = match endpoint {
        CensusEndpoint::Values => {
            if let Some(bad) = request.variables.iter().find(|v| !is_variable_code(v)) {
                return Err(ApiError::invalid_request(format!(
                    "Invalid Census variable: '{}'",
                    bad
                )));
            }

            let mut get = vec!["NAME"];
            get.extend(
                request
                    .variables
                    .iter()
                    .map(String::as_str)
                    .filter(|v| *v != "NAME"),
            );
            let query = query.param("get", get.join(","));

            match &request.region {
                Some(region) => match &region.county_code {
                    Some(county) => query
                        .param("for", format!("county:{}", county))
                        .param("in", format!("state:{}", region.state_code)),
                    None => query.param("for", format!("state:{}", region.state_code)),
                },
                None => query.param("for", "us:1"),
            }
        }
        CensusEndpoint::States => query.param("get", "NAME").param("for", "state:*"),
        CensusEndpoint::Counties => {
            let region = request.region.as_ref().ok_or_else(|| {
                ApiError::invalid_request("County listing requires a state")
            })?;
            query
                .param("get", "NAME")
                .param("for", "county:*")
                .param("in", format!("state:{}", region.state_code))
        }
    };

    Ok(match &request.credentials {
        Some(key) if !key.is_empty() => query.param("key", key.expose()).credential_param("key"),
        _ => query,
    })
}

fn cell_str(row: &[serde_json::Value], index: usize) -> std::result::Result<&str, String> {
    row.get(index)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing text column {}", index))
}

/// Zip the header row with the first data row.
///
/// Columns the upstream omits stay absent in the mapping.
pub fn from_census_values(
    rows: &[Vec<serde_json::Value>],
) -> std::result::Result<serde_json::Map<String, serde_json::Value>, String> {
    let header = rows.first().ok_or("empty response")?;
    let values = rows.get(1).ok_or("no data rows")?;

    let mut map = serde_json::Map::new();
    for (index, name) in header.iter().enumerate() {
        let name = name
            .as_str()
            .ok_or_else(|| format!("header column {} is not text", index))?;
        if let Some(value) = values.get(index) {
            map.insert(name.to_string(), value.clone());
        }
    }
    Ok(map)
}

/// Map listing rows (header skipped) to `{name, id}` pairs.
///
/// States read columns 0 and 1. Counties read the name from column 0 up to
/// the first comma (dropping the state suffix) and the id from column 2.
pub fn from_census_listing(
    rows: &[Vec<serde_json::Value>],
    endpoint: CensusEndpoint,
) -> std::result::Result<Vec<RegionEntry>, String> {
    if rows.is_empty() {
        return Err("empty response".to_string());
    }

    rows.iter()
        .skip(1)
        .map(|row| match endpoint {
            CensusEndpoint::Counties => {
                let full = cell_str(row, 0)?;
                let name = full.split(',').next().unwrap_or(full).trim();
                Ok(RegionEntry::new(name, cell_str(row, 2)?))
            }
            _ => Ok(RegionEntry::new(cell_str(row, 0)?, cell_str(row, 1)?)),
        })
        .collect()
}

/// Census connector
pub struct CensusConnector {
    config: CensusConfig,
    client: Client,
    classifier: Classifier,
}

impl CensusConnector {
    /// Create a new Census connector
    pub fn new(config: CensusConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            classifier: Classifier::new(ProviderKind::Census),
        })
    }

    pub fn config(&self) -> &CensusConfig {
        &self.config
    }
}

#[async_trait]
impl Upstream for CensusConnector {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Census
    }

    #[instrument(skip(self, request), fields(endpoint = %request.endpoint_kind))]
    async fn fetch(&self, request: DataRequest) -> countyscope_core::Result<NormalizedRecord> {
        let endpoint = CensusEndpoint::from_str(&request.endpoint_kind)?;
        let query = to_census_query(&request, &self.config)?;
        debug!(url = %query.public_url(), "Fetching Census data");

        let response = send_get(&self.client, &query, None, None)
            .await
            .map_err(|e| self.classifier.transport(e))?;
        let response = self.classifier.check(response)?;
        let rows: Vec<Vec<serde_json::Value>> = self.classifier.parse(&response)?;

        let data = match endpoint {
            CensusEndpoint::Values => from_census_values(&rows).map(RecordData::Values),
            listing => from_census_listing(&rows, listing).map(RecordData::Regions),
        }
        .map_err(|reason| self.classifier.unexpected(reason, &response))?;

        Ok(NormalizedRecord::new(ProviderKind::Census, query.public_url(), data)
            .with_region(request.region.clone())
            .with_period(request.period().map(str::to_string)))
    }

    fn endpoint_kinds(&self) -> Vec<&'static str> {
        CensusEndpoint::KINDS.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countyscope_core::{ApiKey, ErrorKind, Region};
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<Vec<serde_json::Value>> {
        serde_json::from_value(value).unwrap()
    }

    fn values_request() -> DataRequest {
        DataRequest::new(ProviderKind::Census, "acs")
            .with_period("2022")
            .with_region(Region::county("01", "001"))
            .with_variables(["B01001_001E", "B19013_001E"])
    }

    #[test]
    fn test_county_query() {
        let query = to_census_query(
            &values_request().with_credentials(ApiKey::new("census-key")),
            &CensusConfig::default(),
        )
        .unwrap();

        assert_eq!(query.endpoint(), "https://api.census.gov/data/2022/acs/acs5");
        assert_eq!(query.get("get"), Some("NAME,B01001_001E,B19013_001E"));
        assert_eq!(query.get("for"), Some("county:001"));
        assert_eq!(query.get("in"), Some("state:01"));
        assert_eq!(query.get("key"), Some("census-key"));
        assert!(!query.public_url().contains("census-key"));
    }

    #[test]
    fn test_state_query_has_no_in_clause() {
        let request = DataRequest::new(ProviderKind::Census, "acs")
            .with_period("2021")
            .with_region(Region::state("06"))
            .with_variables(["B01001_001E"]);
        let query = to_census_query(&request, &CensusConfig::default()).unwrap();

        assert_eq!(query.get("for"), Some("state:06"));
        assert_eq!(query.get("in"), None);
        assert_eq!(query.get("key"), None);
    }

    #[test]
    fn test_name_is_not_duplicated() {
        let request = DataRequest::new(ProviderKind::Census, "acs")
            .with_period("2022")
            .with_variables(["NAME", "B01001_001E"]);
        let query = to_census_query(&request, &CensusConfig::default()).unwrap();
        assert_eq!(query.get("get"), Some("NAME,B01001_001E"));
        assert_eq!(query.get("for"), Some("us:1"));
    }

    #[test]
    fn test_missing_or_malformed_year() {
        let request = DataRequest::new(ProviderKind::Census, "acs");
        let err = to_census_query(&request, &CensusConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let request = DataRequest::new(ProviderKind::Census, "acs").with_period("22");
        assert!(to_census_query(&request, &CensusConfig::default()).is_err());
    }

    #[test]
    fn test_signed_year_is_rejected() {
        for year in ["+202", "-202", " 202"] {
            let request = DataRequest::new(ProviderKind::Census, "acs").with_period(year);
            let err = to_census_query(&request, &CensusConfig::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        }
    }

    #[test]
    fn test_bad_variable_is_rejected() {
        let request = DataRequest::new(ProviderKind::Census, "acs")
            .with_period("2022")
            .with_variables(["B01001_001E&for=state:*"]);
        let err = to_census_query(&request, &CensusConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_unknown_endpoint_kind() {
        let request = DataRequest::new(ProviderKind::Census, "decennial").with_period("2020");
        let err = to_census_query(&request, &CensusConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_listing_queries() {
        let states = DataRequest::new(ProviderKind::Census, "states").with_period("2022");
        let query = to_census_query(&states, &CensusConfig::default()).unwrap();
        assert_eq!(query.get("get"), Some("NAME"));
        assert_eq!(query.get("for"), Some("state:*"));

        let counties = DataRequest::new(ProviderKind::Census, "counties")
            .with_period("2022")
            .with_region(Region::state("01"));
        let query = to_census_query(&counties, &CensusConfig::default()).unwrap();
        assert_eq!(query.get("for"), Some("county:*"));
        assert_eq!(query.get("in"), Some("state:01"));

        let no_state = DataRequest::new(ProviderKind::Census, "counties").with_period("2022");
        assert!(to_census_query(&no_state, &CensusConfig::default()).is_err());
    }

    #[test]
    fn test_default_dataset_ignores_year() {
        let selector = DatasetSelector::default();
        assert_eq!(selector.select(2015), "acs/acs5");
        assert_eq!(selector.select(2022), "acs/acs5");
    }

    #[test]
    fn test_dataset_rules_pick_latest_applicable() {
        let selector = DatasetSelector {
            default_dataset: "acs/acs5".to_string(),
            rules: vec![
                DatasetRule {
                    from_year: 2020,
                    dataset: "acs/acs5/profile".to_string(),
                },
                DatasetRule {
                    from_year: 2023,
                    dataset: "acs/acs1".to_string(),
                },
            ],
        };
        assert_eq!(selector.select(2019), "acs/acs5");
        assert_eq!(selector.select(2020), "acs/acs5/profile");
        assert_eq!(selector.select(2024), "acs/acs1");
    }

    #[test]
    fn test_values_zip_header_with_first_row() {
        let rows = rows(json!([["NAME", "B01001_001E"], ["Autauga County, Alabama", "55200"]]));
        let map = from_census_values(&rows).unwrap();
        assert_eq!(
            serde_json::Value::Object(map),
            json!({"NAME": "Autauga County, Alabama", "B01001_001E": "55200"})
        );
    }

    #[test]
    fn test_short_row_leaves_values_absent() {
        let rows = rows(json!([["NAME", "B01001_001E", "B19013_001E"], ["Alabama", "5024279"]]));
        let map = from_census_values(&rows).unwrap();
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("B19013_001E"));
    }

    #[test]
    fn test_null_values_are_kept() {
        let rows = rows(json!([["NAME", "B25077_001E"], ["Loving County, Texas", null]]));
        let map = from_census_values(&rows).unwrap();
        assert_eq!(map["B25077_001E"], serde_json::Value::Null);
    }

    #[test]
    fn test_header_only_is_an_error() {
        let rows = rows(json!([["NAME", "B01001_001E"]]));
        assert_eq!(from_census_values(&rows).unwrap_err(), "no data rows");
    }

    #[test]
    fn test_county_listing_strips_state_suffix() {
        let rows = rows(json!([
            ["NAME", "state", "county"],
            ["Autauga County, Alabama", "01", "001"],
            ["Baldwin County, Alabama", "01", "003"]
        ]));
        let entries = from_census_listing(&rows, CensusEndpoint::Counties).unwrap();
        assert_eq!(entries[0], RegionEntry::new("Autauga County", "001"));
        assert_eq!(entries[1], RegionEntry::new("Baldwin County", "003"));
    }

    #[test]
    fn test_state_listing() {
        let rows = rows(json!([["NAME", "state"], ["Alabama", "01"], ["Alaska", "02"]]));
        let entries = from_census_listing(&rows, CensusEndpoint::States).unwrap();
        assert_eq!(
            entries,
            vec![RegionEntry::new("Alabama", "01"), RegionEntry::new("Alaska", "02")]
        );
    }

    #[test]
    fn test_listing_row_missing_column() {
        let rows = rows(json!([["NAME", "state", "county"], ["Autauga County, Alabama", "01"]]));
        let err = from_census_listing(&rows, CensusEndpoint::Counties).unwrap_err();
        assert_eq!(err, "missing text column 2");
    }
}
