//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{key}`               - Redirect to the stored URL
//! - `GET  /health`              - Health check: store, cache, click queue
//! - `POST /api/url`             - Shorten a URL
//! - `GET  /api/url/{key}`       - Resolve a key
//! - `GET  /api/url/{key}/stats` - Click statistics
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Sliding window on creation, per-IP token bucket on lookups
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// `state.behind_proxy` decides whether both rate limiters read the client IP
/// from forwarding headers instead of the peer socket address.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without path normalization.
///
/// Handlers that rate limit need `ConnectInfo<SocketAddr>` in the request
/// extensions, so the router must be served with connect info.
pub fn router(state: AppState) -> Router {
    let lookups = Router::new()
        .route("/{key}", get(redirect_handler))
        .nest("/api", api::routes::lookup_routes());

    let lookups = if state.behind_proxy {
        lookups.layer(rate_limit::proxied_layer())
    } else {
        lookups.layer(rate_limit::layer())
    };

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::routes::create_routes(&state))
        .merge(lookups)
        .with_state(state)
        .layer(tracing::layer())
}
