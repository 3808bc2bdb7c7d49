use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use haulrate_core::pricing::VolumeDiscountTier;
use haulrate_core::types::ItemCategory;
use haulrate_engine::zone_window_active;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct PricingRuleItem {
    category: ItemCategory,
    label: &'static str,
    unit_rate: Decimal,
    multiplier: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct PricingRulesResponse {
    base_price: Decimal,
    per_item_rate: Decimal,
    service_fee_rate: Decimal,
    minimum_job_price: Decimal,
    rules: Vec<PricingRuleItem>,
    volume_discount_tiers: Vec<VolumeDiscountTier>,
}

/// `GET /api/v1/pricing/rules` — the effective per-category rate card.
pub(super) async fn list_pricing_rules(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<PricingRulesResponse>> {
    let pricing = &state.pricing;
    let rules = ItemCategory::all()
        .iter()
        .map(|&category| {
            let multiplier = pricing.multiplier(category);
            PricingRuleItem {
                category,
                label: category.label(),
                unit_rate: pricing.per_item_rate * multiplier,
                multiplier,
            }
        })
        .collect();

    Json(ApiResponse {
        data: PricingRulesResponse {
            base_price: pricing.base_price,
            per_item_rate: pricing.per_item_rate,
            service_fee_rate: pricing.service_fee_rate,
            minimum_job_price: pricing.minimum_job_price,
            rules,
            volume_discount_tiers: pricing.volume_discount_tiers.clone(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct SurgeZonesQuery {
    /// Instant at which to evaluate each zone's activation window.
    /// Defaults to now.
    pub active_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SurgeZoneItem {
    name: String,
    amount: Decimal,
    is_active: bool,
    days_of_week: Vec<u8>,
    window_active: bool,
}

/// `GET /api/v1/pricing/surge` — configured surge zones and whether each
/// zone's day/time window applies at the evaluation instant.
pub(super) async fn list_surge_zones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SurgeZonesQuery>,
) -> Json<ApiResponse<Vec<SurgeZoneItem>>> {
    let at = query.active_at.unwrap_or_else(Utc::now);

    let data = state
        .pricing
        .surge_zones
        .iter()
        .map(|zone| SurgeZoneItem {
            name: zone.name.clone(),
            amount: zone.amount,
            is_active: zone.is_active,
            days_of_week: zone.days_of_week.clone(),
            window_active: zone_window_active(zone, at),
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
