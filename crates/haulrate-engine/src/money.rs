use rust_decimal::{Decimal, RoundingStrategy};

/// Round a currency amount to 2 decimal places, half away from zero.
///
/// Applied at every aggregation step so repeated estimates over identical
/// inputs never drift by a cent.
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
