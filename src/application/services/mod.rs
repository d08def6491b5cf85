//! Business logic services for the application layer.

pub mod resolver_service;
pub mod url_service;

pub use resolver_service::ResolverService;
pub use url_service::{Assignment, ShortenOutcome, UrlService};
