//! Data Transfer Objects for API requests and responses.
//!
//! Response bodies use camelCase field names.

pub mod health;
pub mod url;
