use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use haulrate_core::pricing::PricingConfig;
use haulrate_core::types::{Address, CartItem, Schedule};

use crate::money::round2;
use crate::surge;
use crate::EstimateError;

pub(crate) const MAX_ITEM_QUANTITY: u32 = 20;

// Duration model carried over from the booking backend.
const BASE_DURATION_MINUTES: u32 = 30;
const MINUTES_PER_ITEM: u32 = 8;

/// One signed line of a price breakdown. Discounts are negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub amount: Decimal,
}

impl BreakdownLine {
    pub(crate) fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// The result of a pricing run: an ordered breakdown whose signed amounts
/// sum exactly to `total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResult {
    pub breakdown: Vec<BreakdownLine>,
    pub total: Decimal,
    pub estimated_duration_minutes: u32,
    /// True when the figure came from the simplified local computation
    /// rather than the authoritative configuration.
    #[serde(default)]
    pub fallback: bool,
}

impl EstimateResult {
    /// Signed sum of the breakdown lines. Always equals `total`.
    #[must_use]
    pub fn breakdown_sum(&self) -> Decimal {
        self.breakdown.iter().map(|line| line.amount).sum()
    }
}

/// Check estimator preconditions on a cart.
///
/// # Errors
///
/// Returns [`EstimateError::Validation`] naming the offending field for an
/// empty cart or an out-of-range quantity. Quantities are never clamped.
pub fn validate_items(items: &[CartItem]) -> Result<(), EstimateError> {
    if items.is_empty() {
        return Err(EstimateError::Validation {
            field: "items",
            reason: "cart must contain at least one item".to_string(),
        });
    }

    for (index, item) in items.iter().enumerate() {
        if item.quantity == 0 {
            return Err(EstimateError::Validation {
                field: "quantity",
                reason: format!("item {index} ({}) has quantity 0; minimum is 1", item.category),
            });
        }
        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(EstimateError::Validation {
                field: "quantity",
                reason: format!(
                    "item {index} ({}) has quantity {}; maximum is {MAX_ITEM_QUANTITY}",
                    item.category, item.quantity
                ),
            });
        }
    }

    Ok(())
}

/// Compute a deterministic price breakdown for a cart.
///
/// `now` supplies all time context: same-day/next-day classification uses
/// its UTC date and surge-zone windows its time of day. Every currency
/// aggregation is rounded to cents before further use.
///
/// # Errors
///
/// Returns [`EstimateError::Validation`] when the cart preconditions fail.
pub fn estimate(
    items: &[CartItem],
    address: Option<&Address>,
    schedule: Option<&Schedule>,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> Result<EstimateResult, EstimateError> {
    validate_items(items)?;

    let total_quantity: u32 = items.iter().map(|item| item.quantity).sum();

    let items_subtotal: Decimal = items
        .iter()
        .map(|item| {
            round2(
                config.per_item_rate
                    * Decimal::from(item.quantity)
                    * config.multiplier(item.category),
            )
        })
        .sum();
    let subtotal = round2(config.base_price + items_subtotal);

    let mut breakdown = vec![BreakdownLine::new("Items Subtotal", subtotal)];

    let volume_discount = config
        .discount_tier(total_quantity)
        .map(|tier| round2(subtotal * tier.discount_rate))
        .filter(|amount| *amount > Decimal::ZERO);
    if let Some(amount) = volume_discount {
        breakdown.push(BreakdownLine::new("Volume Discount", -amount));
    }

    let time_surge = surge::time_surge(schedule, now.date_naive(), &config.time_surge);
    if let Some((label, amount)) = &time_surge {
        breakdown.push(BreakdownLine::new(*label, *amount));
    }

    let zone = surge::active_zone(address.and_then(Address::coords), now, &config.surge_zones);
    if let Some(zone) = zone {
        breakdown.push(BreakdownLine::new(format!("Surge ({})", zone.name), zone.amount));
    }

    let service_fee = round2(subtotal * config.service_fee_rate);
    breakdown.push(BreakdownLine::new("Service Fee", service_fee));

    let raw_total = round2(
        subtotal - volume_discount.unwrap_or(Decimal::ZERO)
            + time_surge.map_or(Decimal::ZERO, |(_, amount)| amount)
            + zone.map_or(Decimal::ZERO, |z| z.amount)
            + service_fee,
    );

    let total = if raw_total < config.minimum_job_price {
        breakdown.push(BreakdownLine::new(
            "Minimum Adjustment",
            config.minimum_job_price - raw_total,
        ));
        config.minimum_job_price
    } else {
        raw_total
    };

    Ok(EstimateResult {
        breakdown,
        total,
        estimated_duration_minutes: estimate_duration(total_quantity),
        fallback: false,
    })
}

/// Rough on-site duration: a fixed setup window plus a per-item allowance.
pub(crate) fn estimate_duration(total_quantity: u32) -> u32 {
    BASE_DURATION_MINUTES + total_quantity * MINUTES_PER_ITEM
}
