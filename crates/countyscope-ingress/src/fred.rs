//! FRED boundary route
//!
//! `GET /fred-proxy?endpoint=<path>&...` forwards every other parameter
//! (including `api_key`) to the upstream and relays its JSON unchanged.

use crate::{
    app::AppState,
    types::{IngressResult, QueryParams},
};
use axum::{Json, Router, extract::State, routing::get};
use countyscope_core::{DataRequest, ProviderKind};
use countyscope_egress::fred::{DEFAULT_ENDPOINT, ENDPOINT_PARAM};
use serde_json::Value;

pub fn router() -> Router<AppState> {
    Router::new().route("/fred-proxy", get(proxy))
}

pub fn fred_request(params: &QueryParams) -> DataRequest {
    let endpoint = params.get(ENDPOINT_PARAM).unwrap_or(DEFAULT_ENDPOINT);

    params
        .without(&[ENDPOINT_PARAM])
        .into_iter()
        .fold(
            DataRequest::new(ProviderKind::Fred, endpoint),
            |request, (name, value)| request.with_param(name, value),
        )
}

async fn proxy(State(state): State<AppState>, params: QueryParams) -> IngressResult<Json<Value>> {
    let record = state.fetch(fred_request(&params)).await?;
    Ok(Json(record.data_json()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_becomes_kind() {
        let params =
            QueryParams::parse(Some("endpoint=series%2Fobservations&series_id=UNRATE")).unwrap();
        let request = fred_request(&params);

        assert_eq!(request.endpoint_kind, "series/observations");
        assert_eq!(
            request.params,
            vec![("series_id".to_string(), "UNRATE".to_string())]
        );
    }

    #[test]
    fn test_default_endpoint() {
        let params = QueryParams::parse(Some("series_id=GNPCA&api_key=abc")).unwrap();
        let request = fred_request(&params);

        assert_eq!(request.endpoint_kind, "series");
        assert_eq!(request.param("api_key"), Some("abc"));
        assert!(request.credentials.is_none());
    }
}
