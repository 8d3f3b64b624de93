use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use storefind_core::{Coordinate, StoreRecord};
use storefind_geocode::{GeocodeError, Geocoder};
use storefind_index::{GeoIndex, IndexError, MemoryIndex, NearestStoreQuery, QueryResult};
use tower::ServiceExt;

use super::stores::normalize_count;
use super::*;

struct FixedGeocoder(Option<Coordinate>);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn resolve(&self, location: &str) -> Result<Coordinate, GeocodeError> {
        self.0.ok_or_else(|| GeocodeError::NoResults {
            location: location.to_string(),
        })
    }
}

struct DownIndex;

#[async_trait]
impl GeoIndex for DownIndex {
    async fn nearest(&self, _query: &NearestStoreQuery) -> Result<QueryResult, IndexError> {
        Err(IndexError::IndexNotFound {
            index: "stores".to_string(),
        })
    }

    async fn ping(&self) -> Result<(), IndexError> {
        Err(IndexError::IndexNotFound {
            index: "stores".to_string(),
        })
    }
}

fn grid_store(i: u32) -> StoreRecord {
    let j = i.to_string();
    let offset = f64::from(i) * 0.000_01;
    StoreRecord {
        name: format!("{j}name"),
        store_location: format!("{j}location"),
        address: format!("{j}address"),
        city: format!("{j}city"),
        state: format!("{j}state"),
        zip_code: j.repeat(5),
        coordinate: Coordinate::new(offset, offset).expect("valid coordinate"),
        county: format!("{j}county"),
    }
}

fn app_with(index: Arc<dyn GeoIndex>, geocoder: FixedGeocoder) -> Router {
    let state = AppState {
        locator: StoreLocator::new(index, Arc::new(geocoder)),
        default_unit: Unit::Miles,
    };
    build_app(state, default_rate_limit_state(), Duration::from_secs(5))
}

fn grid_app() -> Router {
    let index = MemoryIndex::from_records((0..10).map(grid_store)).expect("grid index");
    app_with(
        Arc::new(index),
        FixedGeocoder(Coordinate::new(0.00009, 0.00009).ok()),
    )
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

#[test]
fn normalize_count_applies_defaults_and_bounds() {
    assert_eq!(normalize_count(None), 1);
    assert_eq!(normalize_count(Some(0)), 1);
    assert_eq!(normalize_count(Some(-3)), 1);
    assert_eq!(normalize_count(Some(1_000)), 50);
    assert_eq!(normalize_count(Some(4)), 4);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("geocoding_failed", StatusCode::BAD_GATEWAY),
        ("search_unavailable", StatusCode::SERVICE_UNAVAILABLE),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        ("not_found", StatusCode::INTERNAL_SERVER_ERROR),
        ("something_else", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "msg").into_response();
        assert_eq!(response.status(), status, "{code}");
    }
}

#[tokio::test]
async fn health_reports_ok_for_reachable_index() {
    let (status, json) = get_json(grid_app(), "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["search_backend"], "ok");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn health_reports_degraded_for_unreachable_index() {
    let app = app_with(Arc::new(DownIndex), FixedGeocoder(None));
    let (status, json) = get_json(app, "/api/v1/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["status"], "degraded");
}

#[tokio::test]
async fn nearest_by_coordinate_returns_ordered_envelope() {
    let (status, json) = get_json(grid_app(), "/api/v1/stores/nearest?lat=0&lon=0&count=4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["unit"], "mi");
    let names: Vec<&str> = json["data"]["stores"]
        .as_array()
        .expect("stores array")
        .iter()
        .map(|s| s["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["0name", "1name", "2name", "3name"]);
    assert!(json["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn nearest_reports_reference_distance() {
    let (status, json) =
        get_json(grid_app(), "/api/v1/stores/nearest?lat=0.0001&lon=0.0001").await;

    assert_eq!(status, StatusCode::OK);
    let store = &json["data"]["stores"][0];
    assert_eq!(store["name"], "9name");
    assert_eq!(store["distance"].as_f64(), Some(0.000_981_791_303_092_544_6));
    assert_eq!(store["zip_code"], "99999");
}

#[tokio::test]
async fn nearest_by_zip_goes_through_geocoder() {
    let (status, json) = get_json(grid_app(), "/api/v1/stores/nearest?zip=99999&unit=km").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["unit"], "km");
    assert_eq!(json["data"]["stores"][0]["name"], "9name");
}

#[tokio::test]
async fn nearest_clamps_oversized_count() {
    let (status, json) =
        get_json(grid_app(), "/api/v1/stores/nearest?lat=0&lon=0&count=500").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["stores"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn nearest_without_origin_is_a_validation_error() {
    let (status, json) = get_json(grid_app(), "/api/v1/stores/nearest").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["message"]
        .as_str()
        .expect("message")
        .contains("provide either a location string or a latlong combination"));
}

#[tokio::test]
async fn nearest_with_address_and_zip_is_a_validation_error() {
    let (status, json) =
        get_json(grid_app(), "/api/v1/stores/nearest?address=Main%20St&zip=29201").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn nearest_with_unknown_unit_is_a_validation_error() {
    let (status, json) = get_json(grid_app(), "/api/v1/stores/nearest?lat=0&lon=0&unit=ft").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .expect("message")
        .contains("unit can only be mi or km"));
}

#[tokio::test]
async fn nearest_with_malformed_parameter_keeps_the_envelope() {
    let (status, json) = get_json(grid_app(), "/api/v1/stores/nearest?lat=abc&lon=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["message"]
        .as_str()
        .expect("message")
        .contains("lat"));
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn nearest_with_non_numeric_count_is_a_validation_error() {
    let (status, json) =
        get_json(grid_app(), "/api/v1/stores/nearest?lat=0&lon=0&count=many").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn nearest_maps_geocoding_failure_to_bad_gateway() {
    let index = MemoryIndex::from_records((0..3).map(grid_store)).expect("grid index");
    let app = app_with(Arc::new(index), FixedGeocoder(None));
    let (status, json) = get_json(app, "/api/v1/stores/nearest?address=nowhere").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "geocoding_failed");
}

#[tokio::test]
async fn nearest_maps_query_failure_to_service_unavailable() {
    let app = app_with(Arc::new(DownIndex), FixedGeocoder(None));
    let (status, json) = get_json(app, "/api/v1/stores/nearest?lat=0&lon=0").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "search_unavailable");
}
