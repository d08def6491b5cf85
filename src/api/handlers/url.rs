//! Handlers for the `/api/url` endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::url::{CreateUrlRequest, CreateUrlResponse, LookupResponse, StatsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Shortens a URL.
///
/// # Endpoint
///
/// `POST /api/url`
///
/// # Request Body
///
/// ```json
/// { "value": "example.com/some/page" }
/// ```
///
/// # Response
///
/// `201 Created` for a new record, `200 OK` when the URL was already
/// shortened (with `"message": "URL already shortened"`):
///
/// ```json
/// {
///   "success": true,
///   "url": {
///     "key": "1f3a9c0b",
///     "value": "https://example.com/some/page",
///     "createdAt": "2026-01-01T12:00:00Z"
///   }
/// }
/// ```
///
/// `isFallback: true` is added when every derived key collided.
///
/// # Errors
///
/// Returns 400 Bad Request if the URL is rejected.
/// Returns 429 Too Many Requests when the client budget is spent.
/// Returns 503 Service Unavailable on store failures.
pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), AppError> {
    payload.validate()?;

    let outcome = state.url_service.create_short_url(&payload.value).await?;
    let status = if outcome.is_new() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(outcome.into())))
}

/// Resolves a key to its URL without redirecting.
///
/// # Endpoint
///
/// `GET /api/url/{key}`
///
/// # Response
///
/// ```json
/// { "success": true, "longUrl": "https://example.com/some/page" }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found for unknown keys.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LookupResponse>, AppError> {
    let long_url = state.resolver_service.find_long_url(&key).await?;

    Ok(Json(LookupResponse {
        success: true,
        long_url,
    }))
}

/// Returns click statistics for a key.
///
/// # Endpoint
///
/// `GET /api/url/{key}/stats`
///
/// Reading stats does not count as a click.
///
/// # Errors
///
/// Returns 404 Not Found for unknown keys.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let record = state.resolver_service.get_stats(&key).await?;

    Ok(Json(StatsResponse {
        success: true,
        stats: record.into(),
    }))
}
