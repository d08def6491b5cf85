//! Domain layer containing business entities and the storage contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - The [`repositories::UrlStore`] capability the core consumes
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Background worker applying best-effort click metrics
//!
//! # Click Processing Flow
//!
//! 1. [`crate::application::services::ResolverService`] resolves a key
//! 2. A [`click_event::ClickEvent`] is pushed to a bounded channel without waiting
//! 3. [`click_worker::run_click_worker`] increments `click_count` and sets `last_accessed`
//! 4. Failures are logged and counted; the lookup has already returned

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
