//! Pure building blocks of the shortening core.
//!
//! - [`url_validator`] - URL validation and scheme normalization
//! - [`key_deriver`] - Deterministic hash-derived keys and the fallback key
//! - [`rate_limiter`] - Sliding-window request budget per client

pub mod key_deriver;
pub mod rate_limiter;
pub mod url_validator;
