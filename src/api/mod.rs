//! REST API layer for HTTP request/response handling.
//!
//! Translates HTTP requests into service calls and formats responses. No
//! business rules live here.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Rate limiting and request tracing
//! - [`routes`] - Route groups under `/api`

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
