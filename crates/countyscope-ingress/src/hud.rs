//! HUD boundary route

use crate::{
    app::AppState,
    types::{IngressResult, QueryParams},
};
use axum::{Json, Router, extract::State, routing::get};
use countyscope_core::{DataRequest, ProviderKind, Region};
use serde_json::{Value, json};

pub fn router() -> Router<AppState> {
    Router::new().route("/hud-proxy", get(proxy))
}

pub fn hud_request(params: &QueryParams) -> DataRequest {
    let mut request = DataRequest::new(ProviderKind::Hud, params.get("endpoint").unwrap_or(""));

    if let Some(state) = params.get("state") {
        request = request.with_region(Region::state(state));
    }
    if let Some(year) = params.get("year") {
        request = request.with_period(year);
    }
    if let Some(key) = params.api_key() {
        request = request.with_credentials(key);
    }

    request
}

/// `GET /hud-proxy?endpoint&api_key&state&year`
async fn proxy(State(state): State<AppState>, params: QueryParams) -> IngressResult<Json<Value>> {
    let record = state.fetch(hud_request(&params)).await?;

    Ok(Json(json!({
        "source": "real",
        "endpoint": record.endpoint,
        "data": record.data_json(),
    })))
}
