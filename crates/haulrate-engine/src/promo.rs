use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round2;

/// How a validated promo code discounts an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PromoDiscount {
    /// Flat dollar amount off.
    Fixed(Decimal),
    /// Percentage of the order total, e.g. `20` for 20%.
    Percentage(Decimal),
}

/// A promo code already validated by the promo collaborator service.
///
/// The estimator has no knowledge of codes; it only applies the resulting
/// adjustment against a computed total, after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promo {
    pub discount: PromoDiscount,
    #[serde(default)]
    pub min_order_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoOutcome {
    pub discount: Decimal,
    pub final_price: Decimal,
}

/// Apply a promo adjustment to an estimate total.
///
/// The breakdown is never mutated; the discount is a final subtraction.
/// Orders below `min_order_amount` receive no discount, percentage discounts
/// are capped by `max_discount`, and the final price never goes negative.
///
/// `total` is the charged total, fees and surcharges included; percentage
/// promos are a share of that figure, not of the pre-fee items subtotal.
#[must_use]
pub fn apply_promo(total: Decimal, promo: &Promo) -> PromoOutcome {
    if total < promo.min_order_amount {
        return PromoOutcome {
            discount: Decimal::ZERO,
            final_price: total,
        };
    }

    let mut discount = match promo.discount {
        PromoDiscount::Fixed(amount) => amount,
        // Share of the charged total, fees included.
        PromoDiscount::Percentage(percent) => round2(total * percent / Decimal::ONE_HUNDRED),
    };

    if let Some(cap) = promo.max_discount {
        discount = discount.min(cap);
    }
    discount = discount.min(total).max(Decimal::ZERO);

    PromoOutcome {
        discount,
        final_price: round2(total - discount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn flat_discount_subtracts_from_total() {
        let promo = Promo {
            discount: PromoDiscount::Fixed(dec(2000)),
            min_order_amount: Decimal::ZERO,
            max_discount: None,
        };
        let outcome = apply_promo(dec(15000), &promo);
        assert_eq!(outcome.discount, dec(2000));
        assert_eq!(outcome.final_price, dec(13000));
    }

    #[test]
    fn percentage_discount_is_capped() {
        let promo = Promo {
            discount: PromoDiscount::Percentage(Decimal::from(20)),
            min_order_amount: Decimal::ZERO,
            max_discount: Some(dec(2500)),
        };
        let outcome = apply_promo(dec(20000), &promo);
        // 20% of 200 is 40, capped to 25.
        assert_eq!(outcome.discount, dec(2500));
        assert_eq!(outcome.final_price, dec(17500));
    }

    #[test]
    fn below_minimum_order_gets_no_discount() {
        let promo = Promo {
            discount: PromoDiscount::Fixed(dec(2000)),
            min_order_amount: dec(10000),
            max_discount: None,
        };
        let outcome = apply_promo(dec(9900), &promo);
        assert_eq!(outcome.discount, Decimal::ZERO);
        assert_eq!(outcome.final_price, dec(9900));
    }

    #[test]
    fn oversized_flat_discount_floors_at_zero() {
        let promo = Promo {
            discount: PromoDiscount::Fixed(dec(50000)),
            min_order_amount: Decimal::ZERO,
            max_discount: None,
        };
        let outcome = apply_promo(dec(12000), &promo);
        assert_eq!(outcome.discount, dec(12000));
        assert_eq!(outcome.final_price, Decimal::ZERO);
    }

    #[test]
    fn percentage_rounds_to_cents() {
        let promo = Promo {
            discount: PromoDiscount::Percentage(Decimal::from(15)),
            min_order_amount: Decimal::ZERO,
            max_discount: None,
        };
        let outcome = apply_promo(dec(9999), &promo);
        // 15% of 99.99 = 14.9985 -> 15.00
        assert_eq!(outcome.discount, dec(1500));
        assert_eq!(outcome.final_price, dec(8499));
    }
}
