//! Infrastructure layer for external integrations.
//!
//! Implements the store abstraction declared by the domain layer and the
//! lookup cache.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL and in-memory URL stores

pub mod cache;
pub mod persistence;
