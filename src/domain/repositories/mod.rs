//! Repository trait definitions for the domain layer.
//!
//! The core depends on storage only through [`UrlStore`]. Implementations
//! live in `crate::infrastructure::persistence`; mock implementations are
//! generated via `mockall` for unit tests.

pub mod url_store;

pub use url_store::UrlStore;

#[cfg(test)]
pub use url_store::MockUrlStore;
