//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a key to its stored URL.
///
/// # Endpoint
///
/// `GET /{key}`
///
/// Resolution, caching and click tracking are handled by
/// [`crate::application::services::ResolverService::find_long_url`].
///
/// # Errors
///
/// Returns 404 Not Found if the key doesn't exist.
pub async fn redirect_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.resolver_service.find_long_url(&key).await?;

    Ok(Redirect::temporary(&long_url))
}
