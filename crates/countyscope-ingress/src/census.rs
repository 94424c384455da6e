//! Census boundary routes
//!
//! - `GET /census-proxy?year&state&county&variables=a,b` returns `{variable: value}`
//! - `GET /census-proxy/states?year` returns `[{name, id}]`
//! - `GET /census-proxy/counties?year&state` returns `[{name, id}]`
//!
//! The caller's key is read from `api_key` (or `key`).

use crate::{
    app::AppState,
    types::{IngressResult, QueryParams},
};
use axum::{Json, Router, extract::State, routing::get};
use countyscope_core::{ApiError, DataRequest, ProviderKind, Region};
use serde_json::Value;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/census-proxy", get(values))
        .route("/census-proxy/states", get(states))
        .route("/census-proxy/counties", get(counties))
}

/// Split a comma-separated variable list, dropping blanks
pub fn parse_variables(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_region(params: &QueryParams) -> Result<Option<Region>, ApiError> {
    match (params.get("state"), params.get("county")) {
        (Some(state), Some(county)) => Ok(Some(Region::county(state, county))),
        (Some(state), None) => Ok(Some(Region::state(state))),
        (None, Some(_)) => Err(ApiError::invalid_request(
            "A county requires its state code",
        )),
        (None, None) => Ok(None),
    }
}

/// Translate boundary parameters into a Census data request
pub fn census_request(endpoint_kind: &str, params: &QueryParams) -> IngressResult<DataRequest> {
    let mut request = DataRequest::new(ProviderKind::Census, endpoint_kind);

    if let Some(year) = params.get("year") {
        request = request.with_period(year);
    }
    if let Some(region) = parse_region(params)? {
        request = request.with_region(region);
    }
    if let Some(variables) = params.get("variables") {
        request = request.with_variables(parse_variables(variables));
    }
    if let Some(key) = params.api_key() {
        request = request.with_credentials(key);
    }

    Ok(request)
}

async fn values(State(state): State<AppState>, params: QueryParams) -> IngressResult<Json<Value>> {
    let record = state.fetch(census_request("acs", &params)?).await?;
    Ok(Json(record.data_json()))
}

async fn states(State(state): State<AppState>, params: QueryParams) -> IngressResult<Json<Value>> {
    let record = state.fetch(census_request("states", &params)?).await?;
    Ok(Json(record.data_json()))
}

async fn counties(
    State(state): State<AppState>,
    params: QueryParams,
) -> IngressResult<Json<Value>> {
    let record = state.fetch(census_request("counties", &params)?).await?;
    Ok(Json(record.data_json()))
}
