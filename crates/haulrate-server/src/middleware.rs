use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-token auth for the pricing-configuration read endpoints.
///
/// The public estimate endpoint never sits behind this; only the admin
/// rate-card and surge-zone reads do.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No keys configured; every request passes. Development only.
    Disabled,
    /// Requests must present one of these bearer tokens.
    Keys(Arc<HashSet<String>>),
}

impl AuthState {
    /// Builds auth config from `HAULRATE_API_KEYS` (comma-separated bearer
    /// tokens).
    ///
    /// In development, empty/missing keys disable auth for local iteration.
    /// In non-development envs, empty/missing keys fail startup.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("HAULRATE_API_KEYS").unwrap_or_default();
        let keys: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "HAULRATE_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(AuthState::Disabled);
            }

            anyhow::bail!(
                "HAULRATE_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self::with_keys(keys))
    }

    /// Auth over a fixed key set, independent of the environment.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthState::Keys(Arc::new(keys.into_iter().map(Into::into).collect()))
    }

    fn allows(&self, token: Option<&str>) -> bool {
        match self {
            AuthState::Disabled => true,
            AuthState::Keys(keys) => token.is_some_and(|t| keys.contains(t)),
        }
    }
}

#[derive(Debug)]
struct Window {
    started_at: Instant,
    count: usize,
}

/// Fixed-window request limiter, tracked per caller.
///
/// Windows are keyed by bearer token so one client exhausting its budget
/// cannot starve the others; requests without a token share the anonymous
/// bucket.
#[derive(Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records a hit for `key` and reports whether it stayed within budget.
    async fn try_acquire(&self, key: &str) -> bool {
        let mut windows = self.windows.lock().await;

        // Dropping expired windows up front also bounds the map when
        // callers churn.
        windows.retain(|_, w| w.started_at.elapsed() < self.window);

        let window = windows.entry(key.to_string()).or_insert_with(|| Window {
            started_at: Instant::now(),
            count: 0,
        });

        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is inserted into request
/// extensions as [`RequestId`] and echoed on the response header.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing bearer auth when keys are configured.
///
/// Rejections use the same `{error, meta}` envelope as handler errors.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let allowed = auth.allows(bearer_token(&req));
    if allowed {
        return next.run(req).await;
    }

    ApiError::new(
        request_id_of(&req),
        "unauthorized",
        "missing or invalid bearer token",
    )
    .into_response()
}

/// Middleware enforcing the per-caller fixed-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let key = bearer_token(&req).unwrap_or("anonymous").to_string();
    if rate_limit.try_acquire(&key).await {
        return next.run(req).await;
    }

    ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded").into_response()
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with_auth(value: &str) -> Request {
        axum::http::Request::builder()
            .header(AUTHORIZATION, value)
            .body(Body::empty())
            .expect("request")
    }

    #[test]
    fn bearer_token_accepts_valid_header() {
        let req = request_with_auth("Bearer test-token");
        assert_eq!(bearer_token(&req), Some("test-token"));
    }

    #[test]
    fn bearer_token_rejects_non_bearer_header() {
        let req = request_with_auth("Basic abc123");
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        std::env::remove_var("HAULRATE_API_KEYS");
        let state = AuthState::from_env(true).expect("dev should allow missing keys");
        assert!(matches!(state, AuthState::Disabled));
    }

    #[test]
    fn keyed_auth_requires_matching_token() {
        let auth = AuthState::with_keys(["k1"]);
        assert!(auth.allows(Some("k1")));
        assert!(!auth.allows(Some("k2")));
        assert!(!auth.allows(None));
    }

    #[tokio::test]
    async fn rate_limit_budgets_are_per_key() {
        let limit = RateLimitState::new(2, Duration::from_secs(60));
        assert!(limit.try_acquire("alpha").await);
        assert!(limit.try_acquire("alpha").await);
        assert!(!limit.try_acquire("alpha").await);

        // A different caller still has a full budget.
        assert!(limit.try_acquire("beta").await);
    }

    #[tokio::test]
    async fn rate_limit_window_resets_after_expiry() {
        let limit = RateLimitState::new(1, Duration::from_millis(10));
        assert!(limit.try_acquire("alpha").await);
        assert!(!limit.try_acquire("alpha").await);

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(limit.try_acquire("alpha").await);
    }
}
