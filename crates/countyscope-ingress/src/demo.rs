//! Static chart series for local demos
//!
//! `GET /chart-data` never calls an upstream.

use axum::{Json, Router, routing::get};
use serde::Serialize;

/// One named series in a chart payload
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub label: &'static str,
    pub data: &'static [f64],
}

/// Chart payload consumed by the dashboard's demo view
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub labels: &'static [&'static str],
    pub datasets: &'static [ChartSeries],
}

const LABELS: &[&str] = &["2018", "2019", "2020", "2021", "2022"];

const DATASETS: &[ChartSeries] = &[
    ChartSeries {
        label: "Median Household Income (USD)",
        data: &[58_731.0, 61_363.0, 62_843.0, 64_994.0, 68_315.0],
    },
    ChartSeries {
        label: "Unemployment Rate (%)",
        data: &[4.0, 3.6, 8.1, 5.4, 3.7],
    },
    ChartSeries {
        label: "Median Gross Rent (USD)",
        data: &[1_023.0, 1_062.0, 1_096.0, 1_163.0, 1_268.0],
    },
];

pub const CHART_DATA: ChartData = ChartData {
    labels: LABELS,
    datasets: DATASETS,
};

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/chart-data", get(chart_data))
}

async fn chart_data() -> Json<ChartData> {
    Json(CHART_DATA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_chart_data_is_static() {
        let app: Router = router();

        let response = app
            .oneshot(Request::builder().uri("/chart-data").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["labels"].as_array().unwrap().len(), LABELS.len());
        assert_eq!(body["datasets"][1]["label"], "Unemployment Rate (%)");
        assert_eq!(body["datasets"][0]["data"][4], 68_315.0);
    }
}
