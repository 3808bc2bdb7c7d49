//! HTTP client for the authoritative pricing estimator, with graceful
//! degradation to the local fallback computation when the remote side is
//! unreachable.

mod client;
mod error;
mod types;

pub use client::EstimateClient;
pub use error::ClientError;
pub use types::{EstimateData, EstimateRequest, PromoValidationData};
