//! Core domain entities.
//!
//! - [`UrlRecord`] - A stored key-to-URL mapping with click metrics
//! - [`NewUrlRecord`] - Input for creating a record
//! - [`UrlRecordPatch`] - Partial update of the metric fields
//! - [`CreateOutcome`] - Result of an atomic create-if-absent

pub mod url_record;

pub use url_record::{CreateOutcome, NewUrlRecord, UrlRecord, UrlRecordPatch};
