/// Request throttling
///
/// A token bucket per caller, held in Redis so every API instance shares it.
/// Authenticated routes are keyed by user id, public routes by client IP.
/// The bucket holds `RATE_LIMIT_PER_MINUTE` tokens and refills evenly over a
/// minute.
///
/// # Storage
///
/// Hash per caller at `ratelimit:user:{user_id}` or `ratelimit:ip:{addr}`
/// with fields `tokens` and `last_refill`, expiring after two idle minutes.
///
/// # Headers
///
/// - `X-RateLimit-Limit`: bucket capacity
/// - `X-RateLimit-Remaining`: tokens left after this request
/// - `Retry-After`: seconds to wait (429 responses only)
///
/// Throttling is skipped when no Redis connection is configured.
///
/// # Client address
///
/// Public routes are keyed by the socket peer. `X-Forwarded-For` is read only
/// with `TRUST_PROXY` set, and then only its last hop, which is the one the
/// proxy appended.

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Extension, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use gauss_shared::auth::context::AuthContext;
use redis::aio::ConnectionManager;
use std::net::SocketAddr;

/// Atomic refill-then-take on one bucket
///
/// Returns `{allowed, remaining, retry_after_seconds}`.
const TOKEN_BUCKET_SCRIPT: &str = r#"
local key = KEYS[1]
local capacity = tonumber(ARGV[1])
local refill_rate = tonumber(ARGV[2])
local now = tonumber(ARGV[3])

local bucket = redis.call('HMGET', key, 'tokens', 'last_refill')
local tokens = tonumber(bucket[1])
local last_refill = tonumber(bucket[2])

if not tokens then
    tokens = capacity
    last_refill = now
end

local elapsed = math.max(0, now - last_refill)
tokens = math.min(capacity, tokens + (elapsed * refill_rate))

if tokens >= 1 then
    tokens = tokens - 1
    redis.call('HSET', key, 'tokens', tokens, 'last_refill', now)
    redis.call('EXPIRE', key, 120)
    return {1, math.floor(tokens), 0}
else
    redis.call('HSET', key, 'tokens', tokens, 'last_refill', now)
    redis.call('EXPIRE', key, 120)
    return {0, 0, math.ceil((1 - tokens) / refill_rate)}
end
"#;

/// Bucket shape for a per-minute budget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    pub capacity: u32,

    /// Tokens per second
    pub refill_rate: f64,
}

impl RateLimit {
    pub fn per_minute(requests: u32) -> Self {
        let requests = requests.max(1);
        RateLimit {
            capacity: requests,
            refill_rate: requests as f64 / 60.0,
        }
    }
}

/// Outcome of one bucket check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: u64,
}

impl RateLimitResult {
    fn from_script(values: &[i64]) -> Option<Self> {
        match values {
            [allowed, remaining, retry_after] => Some(RateLimitResult {
                allowed: *allowed == 1,
                remaining: (*remaining).max(0) as u32,
                retry_after: (*retry_after).max(1) as u64,
            }),
            _ => None,
        }
    }
}

/// Throttles authenticated routes; must run inside the auth layer
pub async fn throttle_by_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = format!("ratelimit:user:{}", auth.user_id);
    throttle(&state, key, request, next).await
}

/// Throttles public routes by client address
pub async fn throttle_by_ip(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(&request, state.config.rate_limit.trust_proxy);
    let key = format!("ratelimit:ip:{ip}");
    throttle(&state, key, request, next).await
}

async fn throttle(
    state: &AppState,
    key: String,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(redis) = state.redis.clone() else {
        return Ok(next.run(request).await);
    };

    let limit = RateLimit::per_minute(state.config.rate_limit.per_minute);

    let result = match check_bucket(redis, &key, limit).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Rate limit check failed, allowing request");
            return Ok(next.run(request).await);
        }
    };

    if !result.allowed {
        tracing::debug!(key = %key, retry_after = result.retry_after, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after: result.retry_after,
            message: format!(
                "Too many requests. Try again in {} seconds",
                result.retry_after
            ),
        });
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit.capacity));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(result.remaining));

    Ok(response)
}

async fn check_bucket(
    mut conn: ConnectionManager,
    key: &str,
    limit: RateLimit,
) -> redis::RedisResult<RateLimitResult> {
    let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

    let values: Vec<i64> = redis::Script::new(TOKEN_BUCKET_SCRIPT)
        .key(key)
        .arg(limit.capacity)
        .arg(limit.refill_rate)
        .arg(now)
        .invoke_async(&mut conn)
        .await?;

    RateLimitResult::from_script(&values).ok_or_else(|| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "unexpected token bucket reply",
        ))
    })
}

/// Socket peer address, or the proxy-appended `X-Forwarded-For` hop when
/// the proxy is trusted
fn client_ip(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
