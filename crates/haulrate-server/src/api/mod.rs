mod estimate;
mod pricing;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use haulrate_core::pricing::PricingConfig;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<PricingConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    surge_zones: usize,
    discount_tiers: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/pricing/rules", get(pricing::list_pricing_rules))
        .route("/api/v1/pricing/surge", get(pricing::list_surge_zones))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    // The estimate endpoint stays public: the booking wizard prices carts
    // before any account exists.
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/estimate", post(estimate::create_estimate));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    // Pricing config is loaded and validated at startup, so reaching this
    // handler at all means the service is able to price.
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                surge_zones: state.pricing.surge_zones.len(),
                discount_tiers: state.pricing.volume_discount_tiers.len(),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    use haulrate_core::pricing::{SurgeZone, TimeSurge, VolumeDiscountTier};
    use haulrate_core::types::ItemCategory;

    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn test_pricing() -> PricingConfig {
        PricingConfig {
            base_price: dec(9900),
            per_item_rate: dec(3500),
            category_multipliers: HashMap::from([
                (ItemCategory::Appliances, Decimal::new(13, 1)),
                (ItemCategory::Construction, Decimal::new(12, 1)),
            ]),
            volume_discount_tiers: vec![
                VolumeDiscountTier {
                    min_qty: 4,
                    max_qty: Some(7),
                    discount_rate: dec(10),
                },
                VolumeDiscountTier {
                    min_qty: 7,
                    max_qty: None,
                    discount_rate: dec(15),
                },
            ],
            service_fee_rate: dec(8),
            minimum_job_price: dec(9900),
            time_surge: TimeSurge::default(),
            surge_zones: vec![SurgeZone {
                name: "downtown".to_string(),
                boundary: vec![
                    [34.00, -118.30],
                    [34.00, -118.20],
                    [34.10, -118.20],
                    [34.10, -118.30],
                ],
                amount: dec(2000),
                start_time: None,
                end_time: None,
                days_of_week: vec![],
                is_active: true,
            }],
        }
    }

    fn test_app() -> Router {
        build_app(
            AppState {
                pricing: Arc::new(test_pricing()),
            },
            AuthState::Disabled,
            default_rate_limit_state(),
        )
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    fn post_estimate(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/estimate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn estimate_returns_priced_breakdown() {
        let app = test_app();
        let response = app
            .oneshot(post_estimate(serde_json::json!({
                "items": [{ "category": "general", "quantity": 1 }]
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        // 99 + 35 = 134.00, +8% fee = 144.72.
        assert_eq!(json["data"]["estimated_price"].as_str(), Some("144.72"));
        assert_eq!(
            json["data"]["breakdown"][0]["label"].as_str(),
            Some("Items Subtotal")
        );
        assert_eq!(json["data"]["fallback"].as_bool(), Some(false));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn estimate_applies_zone_surge_for_geocoded_address() {
        let app = test_app();
        let response = app
            .oneshot(post_estimate(serde_json::json!({
                "items": [{ "category": "general", "quantity": 1 }],
                "address": { "zip": "90012", "lat": 34.05, "lng": -118.25 }
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let labels: Vec<&str> = json["data"]["breakdown"]
            .as_array()
            .expect("breakdown array")
            .iter()
            .filter_map(|l| l["label"].as_str())
            .collect();
        assert!(
            labels.contains(&"Surge (downtown)"),
            "expected zone surge line, got {labels:?}"
        );
        assert_eq!(json["data"]["estimated_price"].as_str(), Some("164.72"));
    }

    #[tokio::test]
    async fn estimate_rejects_empty_cart_with_validation_error() {
        let app = test_app();
        let response = app
            .oneshot(post_estimate(serde_json::json!({ "items": [] })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
        assert!(json["error"]["message"]
            .as_str()
            .expect("message")
            .contains("items"));
    }

    #[tokio::test]
    async fn estimate_rejects_oversized_quantity() {
        let app = test_app();
        let response = app
            .oneshot(post_estimate(serde_json::json!({
                "items": [{ "category": "furniture", "quantity": 50 }]
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .expect("message")
            .contains("quantity"));
    }

    #[tokio::test]
    async fn estimate_undeserializable_body_keeps_error_envelope() {
        let app = test_app();
        // Negative quantity fails u32 deserialization inside the extractor.
        let response = app
            .oneshot(post_estimate(serde_json::json!({
                "items": [{ "category": "general", "quantity": -1 }]
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("bad_request"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn health_reports_loaded_pricing() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert_eq!(json["data"]["surge_zones"].as_u64(), Some(1));
    }

    #[tokio::test]
    async fn pricing_rules_lists_every_category() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pricing/rules")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let rules = json["data"]["rules"].as_array().expect("rules array");
        assert_eq!(rules.len(), ItemCategory::all().len());
        let appliances = rules
            .iter()
            .find(|r| r["category"] == "appliances")
            .expect("appliances rule");
        assert_eq!(appliances["unit_rate"].as_str(), Some("45.500"));
    }

    #[tokio::test]
    async fn surge_zones_report_window_state_at_instant() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pricing/surge?active_at=2026-08-26T17:00:00Z")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let zones = json["data"].as_array().expect("zones array");
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0]["name"].as_str(), Some("downtown"));
        assert_eq!(zones[0]["window_active"].as_bool(), Some(true));
    }

    #[tokio::test]
    async fn protected_route_rejects_missing_bearer_token_with_envelope() {
        let app = build_app(
            AppState {
                pricing: Arc::new(test_pricing()),
            },
            AuthState::with_keys(["admin-key"]),
            default_rate_limit_state(),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pricing/rules")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("unauthorized"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn rate_limit_is_tracked_per_bearer_token() {
        let app = build_app(
            AppState {
                pricing: Arc::new(test_pricing()),
            },
            AuthState::with_keys(["alpha", "beta"]),
            RateLimitState::new(1, Duration::from_secs(60)),
        );
        let get_rules = |token: &str| {
            Request::builder()
                .uri("/api/v1/pricing/rules")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .expect("request")
        };

        let first = app
            .clone()
            .oneshot(get_rules("alpha"))
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::OK);

        let limited = app
            .clone()
            .oneshot(get_rules("alpha"))
            .await
            .expect("response");
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = json_body(limited).await;
        assert_eq!(json["error"]["code"].as_str(), Some("rate_limited"));

        // A different caller's budget is untouched.
        let other = app.oneshot(get_rules("beta")).await.expect("response");
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn request_id_header_is_echoed() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "trace-me-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("trace-me-123")
        );
    }
}
