use std::time::Duration;

use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Serialize;

use haulrate_core::types::{Address, CartItem, Schedule};
use haulrate_engine::{fallback_estimate, validate_items, EstimateError, EstimateResult};

use crate::error::ClientError;
use crate::types::{Envelope, ErrorEnvelope, EstimateData, EstimateRequest, PromoValidationData};

/// Client for the pricing service REST API.
///
/// Use [`EstimateClient::new`] for production or point `base_url` at a mock
/// server in tests. One request per call; no retries — callers that need
/// resilience go through [`EstimateClient::estimate_or_fallback`].
pub struct EstimateClient {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct PromoValidationRequest<'a> {
    code: &'a str,
    order_total: Decimal,
}

impl EstimateClient {
    /// Creates a new client for the given service base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("haulrate/0.1 (pricing-client)")
            .build()?;

        // Normalise: exactly one trailing slash so Url::join appends path
        // segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Requests an authoritative estimate from the remote service.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the service returned its error envelope.
    /// - [`ClientError::Http`] on network failure or an unenveloped non-2xx.
    /// - [`ClientError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn estimate(&self, request: &EstimateRequest) -> Result<EstimateData, ClientError> {
        let envelope: Envelope<EstimateData> =
            self.post_json("api/v1/estimate", request, "estimate").await?;
        Ok(envelope.data)
    }

    /// Estimates a cart, degrading to the local fallback computation when
    /// the remote estimator is unreachable or misbehaving.
    ///
    /// Validation runs before any network call; a cart that fails
    /// preconditions is rejected without touching the wire. Remote failures
    /// are logged and absorbed — the caller always gets a result, flagged
    /// `fallback` when it came from the simplified local path.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Validation`] only.
    pub async fn estimate_or_fallback(
        &self,
        items: &[CartItem],
        address: Option<Address>,
        schedule: Option<Schedule>,
    ) -> Result<EstimateResult, EstimateError> {
        validate_items(items)?;

        let request = EstimateRequest {
            items: items.to_vec(),
            address,
            schedule,
        };

        match self.estimate(&request).await {
            Ok(data) => Ok(EstimateResult {
                breakdown: data.breakdown,
                total: data.estimated_price,
                estimated_duration_minutes: data.estimated_duration_minutes,
                fallback: data.fallback,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "remote estimator unavailable, using fallback pricing");
                fallback_estimate(items)
            }
        }
    }

    /// Validates a promo code against the promo collaborator.
    ///
    /// Promo validation has no fallback path: an unreachable collaborator
    /// means the code is simply not applied.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`EstimateClient::estimate`].
    pub async fn validate_promo(
        &self,
        code: &str,
        order_total: Decimal,
    ) -> Result<PromoValidationData, ClientError> {
        let request = PromoValidationRequest { code, order_total };
        let envelope: Envelope<PromoValidationData> = self
            .post_json("api/v1/promos/validate", &request, "validate_promo")
            .await?;
        Ok(envelope.data)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, context: &str) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;

        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Prefer the structured envelope; fall back to the raw status.
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
                return Err(ClientError::Api {
                    code: envelope.error.code,
                    message: envelope.error.message,
                });
            }
            return Err(ClientError::Api {
                code: status.as_u16().to_string(),
                message: format!("{context}: unexpected response status"),
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Deserialize {
            context: format!("{context} ({url})"),
            source: e,
        })
    }
}
