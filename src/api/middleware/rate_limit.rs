//! Rate limiting middleware.
//!
//! Two mechanisms guard different routes:
//!
//! - a token bucket (`tower_governor`) on lookups and redirects
//! - the sliding-window [`crate::utils::rate_limiter::SlidingWindowRateLimiter`]
//!   on URL creation, keyed by the client address as seen by this server

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Client key used when no address can be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Creates the token-bucket limiter for lookup endpoints.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Keys are
/// the socket peer address.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(100)
            .finish()
            .expect("non-zero rate and burst"),
    );

    GovernorLayer::new(governor_conf)
}

/// Same limits as [`layer`], keyed by `X-Forwarded-For` / `X-Real-IP`.
///
/// Enable only behind a trusted reverse proxy.
pub fn proxied_layer()
-> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(100)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("non-zero rate and burst"),
    );

    GovernorLayer::new(governor_conf)
}

/// Applies the sliding-window budget to URL creation.
///
/// # Errors
///
/// Returns [`AppError::RateLimited`] once the client has used its budget
/// for the current window. Rejected requests are not recorded.
pub async fn sliding_window(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(req.headers(), peer, state.behind_proxy);

    if !state.rate_limiter.check(&client) {
        debug!(client = %client, "Create request rejected by rate limiter");
        let settings = state.rate_limiter.settings();
        return Err(AppError::rate_limited(
            "Too many requests. Please wait a moment and try again",
            json!({
                "max_requests": settings.max_requests,
                "window_ms": settings.window_ms,
            }),
        ));
    }

    Ok(next.run(req).await)
}

/// Identifies the client for rate limiting.
///
/// Forwarding headers are only trusted when `behind_proxy` is set; the
/// first `X-Forwarded-For` hop wins over `X-Real-IP`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded.or(real_ip) {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
