use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use haulrate_core::types::{Address, CartItem, Schedule};
use haulrate_engine::{BreakdownLine, EstimateError};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct EstimateBody {
    items: Vec<CartItem>,
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    schedule: Option<Schedule>,
}

#[derive(Debug, Serialize)]
pub(super) struct EstimateResponse {
    pub estimated_price: Decimal,
    pub breakdown: Vec<BreakdownLine>,
    pub estimated_duration_minutes: u32,
    pub fallback: bool,
}

/// `POST /api/v1/estimate` — the authoritative pricing computation.
///
/// Public: the booking wizard calls this before the customer has an
/// account. Validation failures come back as `validation_error` with the
/// offending field in the message; nothing is clamped server-side. Bodies
/// the extractor cannot deserialize keep the same error envelope as
/// `bad_request`.
pub(super) async fn create_estimate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<EstimateBody>, JsonRejection>,
) -> Result<Json<ApiResponse<EstimateResponse>>, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    let result = haulrate_engine::estimate(
        &body.items,
        body.address.as_ref(),
        body.schedule.as_ref(),
        &state.pricing,
        Utc::now(),
    )
    .map_err(|e| map_estimate_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: EstimateResponse {
            estimated_price: result.total,
            breakdown: result.breakdown,
            estimated_duration_minutes: result.estimated_duration_minutes,
            fallback: false,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_estimate_error(request_id: String, error: &EstimateError) -> ApiError {
    tracing::debug!(error = %error, field = error.field(), "estimate request rejected");
    ApiError::new(request_id, "validation_error", error.to_string())
}
