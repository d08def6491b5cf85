//! Application layer services implementing business logic.
//!
//! Services coordinate the validator, key deriver, store and cache, and give
//! HTTP handlers and the admin CLI a single API.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Key assignment with collision handling
//! - [`services::resolver_service::ResolverService`] - Lookups, statistics and administration

pub mod services;
