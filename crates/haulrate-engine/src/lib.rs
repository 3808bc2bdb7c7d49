//! The pricing estimator: a pure function from cart, address, schedule, and
//! pricing configuration to an ordered price breakdown.
//!
//! Nothing in this crate reads a clock, performs I/O, or holds state; the
//! evaluation instant is an explicit argument so repeated calls with the same
//! inputs always produce the same result.

mod estimate;
mod fallback;
mod money;
mod promo;
mod surge;

use thiserror::Error;

pub use estimate::{estimate, validate_items, BreakdownLine, EstimateResult};
pub use fallback::fallback_estimate;
pub use promo::{apply_promo, Promo, PromoDiscount, PromoOutcome};
pub use surge::zone_window_active;

#[derive(Debug, Error)]
pub enum EstimateError {
    /// A precondition on the request failed. Raised before any pricing math
    /// runs and, in callers that talk to the remote estimator, before any
    /// network call.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl EstimateError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            EstimateError::Validation { field, .. } => field,
        }
    }
}
