use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use storefind_core::CoreError;
use storefind_locator::{format_structured, LocateError, LocateRequest};

use crate::middleware::RequestId;

use super::{map_locate_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) const MAX_COUNT: i64 = 50;

#[derive(Debug, Serialize)]
pub(super) struct NearestStores {
    unit: &'static str,
    stores: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct NearestQuery {
    pub address: Option<String>,
    pub zip: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub unit: Option<String>,
    pub count: Option<i64>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn normalize_count(count: Option<i64>) -> usize {
    count.unwrap_or(1).clamp(1, MAX_COUNT) as usize
}

impl NearestQuery {
    fn to_request(&self, default_unit: &str) -> Result<LocateRequest, CoreError> {
        let location = match (self.address.as_deref(), self.zip.as_deref()) {
            (Some(_), Some(_)) => return Err(CoreError::AmbiguousOrigin),
            (address, zip) => address.or(zip),
        };
        let unit = self.unit.as_deref().unwrap_or(default_unit);
        Ok(
            LocateRequest::from_parts(location, self.lat, self.lon, unit)?
                .with_count(normalize_count(self.count)),
        )
    }
}

pub(super) async fn nearest_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<NearestQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<NearestStores>>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            rejection.body_text(),
        )
    })?;

    let request = query
        .to_request(state.default_unit.label())
        .map_err(|e| map_locate_error(req_id.0.clone(), &LocateError::from(e)))?;

    let result = state
        .locator
        .locate(&request)
        .await
        .map_err(|e| map_locate_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: NearestStores {
            unit: result.unit.label(),
            stores: serde_json::json!(format_structured(&result)),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
