//! Tests for data requests

use super::*;
use crate::error::ErrorKind;

#[test]
fn test_provider_from_str() {
    assert_eq!("census".parse::<ProviderKind>().unwrap(), ProviderKind::Census);
    assert_eq!("FRED".parse::<ProviderKind>().unwrap(), ProviderKind::Fred);
    assert_eq!("hud".parse::<ProviderKind>().unwrap(), ProviderKind::Hud);
}

#[test]
fn test_unknown_provider_is_invalid_request() {
    let err = "bls".parse::<ProviderKind>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(err.http_status, 400);
}

#[test]
fn test_failure_status_per_provider() {
    assert_eq!(ProviderKind::Census.failure_status(), 500);
    assert_eq!(ProviderKind::Fred.failure_status(), 500);
    assert_eq!(ProviderKind::Hud.failure_status(), 502);
}

#[test]
fn test_api_key_debug_is_redacted() {
    let key = ApiKey::new("super-secret-key-value");
    let printed = format!("{:?}", key);
    assert!(!printed.contains("super-secret"));
    assert_eq!(printed, "ApiKey(<22 chars>)");
}

#[test]
fn test_request_debug_hides_credentials() {
    let request = DataRequest::new(ProviderKind::Hud, "fair-market-rents")
        .with_credentials(ApiKey::new("abcdefghijklmnopqrstuvwxyz"));
    let printed = format!("{:?}", request);
    assert!(!printed.contains("abcdefghij"));
}

#[test]
fn test_builder_preserves_variable_order() {
    let request = DataRequest::new(ProviderKind::Census, "acs")
        .with_variables(["B19013_001E", "B01001_001E", "B25077_001E"]);
    assert_eq!(
        request.variables,
        vec!["B19013_001E", "B01001_001E", "B25077_001E"]
    );
}

#[test]
fn test_or_credentials_prefers_request_key() {
    let config_key = ApiKey::new("from-config");
    let request = DataRequest::new(ProviderKind::Fred, "series")
        .with_credentials(ApiKey::new("from-request"))
        .or_credentials(Some(&config_key));
    assert_eq!(request.credentials.unwrap().expose(), "from-request");

    let request = DataRequest::new(ProviderKind::Fred, "series").or_credentials(Some(&config_key));
    assert_eq!(request.credentials.unwrap().expose(), "from-config");
}

#[test]
fn test_period_and_param_lookup() {
    let request = DataRequest::new(ProviderKind::Fred, "series")
        .with_param("series_id", "GNPCA")
        .with_param("file_type", "json")
        .with_period("2023");
    assert_eq!(request.param("series_id"), Some("GNPCA"));
    assert_eq!(request.param("missing"), None);
    assert_eq!(request.period(), Some("2023"));
}

#[test]
fn test_region_constructors() {
    let state = Region::state("01");
    assert_eq!(state.county_code, None);

    let county = Region::county("01", "001");
    assert_eq!(county.state_code, "01");
    assert_eq!(county.county_code.as_deref(), Some("001"));

    let json = serde_json::to_value(&state).unwrap();
    assert!(json.get("county_code").is_none());
}
