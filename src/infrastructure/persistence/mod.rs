//! URL store implementations.
//!
//! # Stores
//!
//! - [`PgUrlStore`] - PostgreSQL storage, selected when `DATABASE_URL` is set
//! - [`MemoryUrlStore`] - In-process storage for development and tests

pub mod memory_url_store;
pub mod pg_url_store;

pub use memory_url_store::MemoryUrlStore;
pub use pg_url_store::PgUrlStore;
