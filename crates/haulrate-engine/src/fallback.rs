use rust_decimal::Decimal;

use haulrate_core::types::{CartItem, ItemCategory};

use crate::estimate::{estimate_duration, BreakdownLine, EstimateResult};
use crate::money::round2;
use crate::{validate_items, EstimateError};

// Fixed constants for the degraded path. These are deliberately NOT read
// from `PricingConfig`: when the authoritative estimator is unreachable the
// caller may not have a trustworthy configuration either.
const BASE_PRICE_CENTS: i64 = 9900;
const PER_ITEM_RATE_CENTS: i64 = 3500;
const SERVICE_FEE_RATE_BP: i64 = 8; // 0.08

fn fallback_multiplier(category: ItemCategory) -> Decimal {
    match category {
        ItemCategory::Appliances => Decimal::new(13, 1),
        ItemCategory::Construction => Decimal::new(12, 1),
        _ => Decimal::ONE,
    }
}

/// Simplified local estimate used when the remote estimator is unreachable.
///
/// Flat base price, fixed per-item rate, appliance/construction multipliers,
/// and an 8% service fee. No volume discount, no surge, no minimum floor.
/// The result is flagged `fallback` so the UI can disclose that the figure
/// is approximate.
///
/// # Errors
///
/// Returns [`EstimateError::Validation`] under the same cart preconditions
/// as the full estimator.
pub fn fallback_estimate(items: &[CartItem]) -> Result<EstimateResult, EstimateError> {
    validate_items(items)?;

    let base_price = Decimal::new(BASE_PRICE_CENTS, 2);
    let per_item_rate = Decimal::new(PER_ITEM_RATE_CENTS, 2);
    let fee_rate = Decimal::new(SERVICE_FEE_RATE_BP, 2);

    let total_quantity: u32 = items.iter().map(|item| item.quantity).sum();
    let items_subtotal: Decimal = items
        .iter()
        .map(|item| {
            round2(per_item_rate * Decimal::from(item.quantity) * fallback_multiplier(item.category))
        })
        .sum();

    let subtotal = round2(base_price + items_subtotal);
    let service_fee = round2(subtotal * fee_rate);
    let total = round2(subtotal + service_fee);

    Ok(EstimateResult {
        breakdown: vec![
            BreakdownLine::new("Base Price", base_price),
            BreakdownLine::new("Items Subtotal", items_subtotal),
            BreakdownLine::new("Service Fee (8%)", service_fee),
        ],
        total,
        estimated_duration_minutes: estimate_duration(total_quantity),
        fallback: true,
    })
}
