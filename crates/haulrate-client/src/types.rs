use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use haulrate_core::types::{Address, CartItem, Schedule};
use haulrate_engine::{BreakdownLine, Promo};

/// Body of `POST /api/v1/estimate`.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateRequest {
    pub items: Vec<CartItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

/// The `data` payload of a successful estimate response.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateData {
    pub estimated_price: Decimal,
    pub breakdown: Vec<BreakdownLine>,
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub fallback: bool,
}

/// The `data` payload of a successful promo validation.
#[derive(Debug, Clone, Deserialize)]
pub struct PromoValidationData {
    pub code: String,
    #[serde(flatten)]
    pub promo: Promo,
}

/// Generic success envelope used by the pricing service.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: String,
    pub message: String,
}
