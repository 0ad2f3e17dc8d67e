//! 전체 API 라우터 통합 테스트.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DurationRound, TimeDelta, Utc};
use rust_decimal_macros::dec;
use spot_api::{create_api_router, AppState};
use spot_core::{AreaTag, RawSample, StoredPoint, TaxRate, UnitTaxTransform};
use spot_data::{MemoryPriceStore, PriceStore};
use tower::ServiceExt;

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn seeded_app(default_tax: TaxRate) -> Router {
    let store = Arc::new(MemoryPriceStore::new());
    let transform = UnitTaxTransform::new();
    let base = Utc::now().duration_trunc(TimeDelta::hours(1)).unwrap() - TimeDelta::hours(2);

    let mut points = Vec::new();
    for (code, prices) in [("BE", [dec!(50), dec!(80)]), ("NL", [dec!(60), dec!(90)])] {
        let area = AreaTag::new(code).unwrap();
        for (i, price) in prices.into_iter().enumerate() {
            let sample = RawSample::new(base + TimeDelta::hours(i as i64), price);
            points.push(StoredPoint::day_ahead(&area, &sample, &transform));
        }
    }
    store.write_points(&points).await.unwrap();

    create_api_router().with_state(Arc::new(AppState::new(store, default_tax)))
}

#[tokio::test]
async fn prices_are_contiguous_per_area() {
    let app = seeded_app(TaxRate::ZERO).await;

    let (status, body) = get_json(app, "/prices?country=BE").await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // 첫 구간의 종료 시각은 다음 샘플의 시작 시각
    assert_eq!(entries[0]["end"], entries[1]["start"]);
    assert_eq!(entries[0]["value"], serde_json::json!(5.0));
    assert_eq!(entries[1]["value"], serde_json::json!(8.0));
    assert!(entries[0]["start"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn server_default_tax_applies_without_parameter() {
    let app = seeded_app(TaxRate::new(dec!(0.21)).unwrap()).await;

    let (_, body) = get_json(app.clone(), "/prices?country=NL").await;
    assert_eq!(body[0]["value"], serde_json::json!(7.26));

    let (_, body) = get_json(app, "/prices?country=NL&tax=0").await;
    assert_eq!(body[0]["value"], serde_json::json!(6.0));
}

#[tokio::test]
async fn unfiltered_query_returns_every_area() {
    let app = seeded_app(TaxRate::ZERO).await;

    let (status, body) = get_json(app, "/prices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = seeded_app(TaxRate::ZERO).await;

    let (status, body) = get_json(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(app.clone(), "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"]["status"], "up");

    let (status, body) = get_json(app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/prices"].is_object());
}
