//! DTOs for the create, lookup and stats endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::ShortenOutcome;
use crate::domain::entities::UrlRecord;

/// Request body for `POST /api/url`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "URL is required"))]
    pub value: String,
}

/// Response body for `POST /api/url`.
#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub success: bool,

    /// Present when the URL had already been shortened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub url: UrlView,
}

impl From<ShortenOutcome> for CreateUrlResponse {
    fn from(outcome: ShortenOutcome) -> Self {
        let message = (!outcome.is_new()).then(|| "URL already shortened".to_string());

        Self {
            success: true,
            message,
            url: outcome.record.into(),
        }
    }
}

/// Public view of a stored record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlView {
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

impl From<UrlRecord> for UrlView {
    fn from(record: UrlRecord) -> Self {
        Self {
            key: record.key,
            value: record.value,
            created_at: record.created_at,
            is_fallback: record.is_fallback,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Response body for `GET /api/url/{key}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub success: bool,
    pub long_url: String,
}

/// Response body for `GET /api/url/{key}/stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: UrlStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlStats {
    pub key: String,
    pub original_url: String,
    pub click_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl From<UrlRecord> for UrlStats {
    fn from(record: UrlRecord) -> Self {
        Self {
            key: record.key,
            original_url: record.value,
            click_count: record.click_count,
            created_at: record.created_at,
            last_accessed: record.last_accessed,
        }
    }
}
