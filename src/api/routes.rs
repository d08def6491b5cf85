//! Route groups under `/api`.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::api::handlers::{create_url_handler, lookup_handler, stats_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;

/// URL creation, guarded by the sliding-window limiter.
///
/// - `POST /url` - Shorten a URL
pub fn create_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/url", post(create_url_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::sliding_window,
        ))
}

/// Read-only lookups.
///
/// - `GET /url/{key}`       - Resolve a key without redirecting
/// - `GET /url/{key}/stats` - Click statistics for a key
pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/url/{key}", get(lookup_handler))
        .route("/url/{key}/stats", get(stats_handler))
}
