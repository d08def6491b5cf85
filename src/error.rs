use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::url_validator::UrlValidationError;

/// Failure body shared by every endpoint: `{ "success": false, "message", ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Closed set of failures produced by the core and the HTTP layer.
///
/// Collision exhaustion has no variant: it is absorbed by the
/// fallback-key path and never reaches callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad or unsafe input, correctable by the user.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Unknown key on lookup.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Backing store unreachable or failed. Never retried inside the core.
    #[error("{message}")]
    Storage { message: String, details: Value },

    /// Request budget for the client is exhausted.
    #[error("{message}")]
    RateLimited { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }
    pub fn rate_limited(message: impl Into<String>, details: Value) -> Self {
        Self::RateLimited {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Machine-readable code used in response bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Storage { .. } => "storage_error",
            AppError::RateLimited { .. } => "rate_limited",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Storage { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into the serializable failure body.
    pub fn to_error_body(&self) -> ErrorBody {
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::Storage { message, details }
            | AppError::RateLimited { message, details }
            | AppError::Internal { message, details } => (message.clone(), details.clone()),
        };

        ErrorBody {
            success: false,
            code: self.code(),
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Storage { ref message, .. } | AppError::Internal { ref message, .. } =
            self
        {
            tracing::error!(code = self.code(), "{}", message);
        }

        (self.status(), Json(self.to_error_body())).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let message = e
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());

        AppError::bad_request(message, json!({ "fields": e.to_string() }))
    }
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        AppError::bad_request(e.to_string(), json!({ "reason": e.reason() }))
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::storage("Storage unavailable", json!({ "reason": e.to_string() }))
        }
        _ => AppError::storage("Storage operation failed", json!({ "reason": e.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::bad_request("x", json!({})).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("x", json!({})).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::storage("x", json!({})).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::rate_limited("x", json!({})).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = AppError::not_found("URL not found", json!({ "key": "abcd1234" })).to_error_body();

        assert!(!body.success);
        assert_eq!(body.code, "not_found");
        assert_eq!(body.message, "URL not found");
        assert_eq!(body.details["key"], "abcd1234");
    }

    #[test]
    fn test_display_uses_message() {
        let err = AppError::storage("Storage unavailable", json!({}));
        assert_eq!(err.to_string(), "Storage unavailable");
    }

    #[test]
    fn test_sqlx_error_maps_to_storage() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Storage { .. }));
    }

    #[test]
    fn test_url_validation_error_maps_to_validation() {
        let err: AppError = UrlValidationError::Empty.into();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
