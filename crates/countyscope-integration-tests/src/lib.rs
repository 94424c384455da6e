//! End-to-end integration tests for CountyScope
//!
//! These tests wire the ingress router to the real egress connectors and
//! point the connectors at mock upstreams.

#[cfg(test)]
mod e2e_tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use countyscope_egress::{
        ProviderSet,
        census::CensusConfig,
        fred::FredConfig,
        hud::HudConfig,
    };
    use countyscope_ingress::{AppState, router};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    #[tokio::test]
    async fn test_e2e_census_county_values() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2022/acs/acs5"))
            .and(query_param("get", "NAME,B01001_001E"))
            .and(query_param("for", "county:001"))
            .and(query_param("in", "state:01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                ["NAME", "B01001_001E", "state", "county"],
                ["Autauga County, Alabama", "55200", "01", "001"]
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let providers = ProviderSet::from_configs(
            CensusConfig::default().with_base_url(mock_server.uri()),
            FredConfig::default().with_base_url(mock_server.uri()),
            HudConfig::default().with_base_url(mock_server.uri()),
        )
        .unwrap();
        let app = router(AppState::new(providers));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/census-proxy?year=2022&state=01&county=001&variables=B01001_001E")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["NAME"], "Autauga County, Alabama");
        assert_eq!(body["B01001_001E"], "55200");
        assert_eq!(body["county"], "001");
    }
}
