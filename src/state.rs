//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{ResolverService, UrlService};
use crate::config::ShortenerSettings;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlStore;
use crate::infrastructure::cache::CacheService;
use crate::utils::rate_limiter::SlidingWindowRateLimiter;
use crate::utils::url_validator::UrlValidator;

#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub resolver_service: Arc<ResolverService>,
    pub rate_limiter: Arc<SlidingWindowRateLimiter>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client identification.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services over one store and cache.
    pub fn new(
        store: Arc<dyn UrlStore>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: &ShortenerSettings,
        behind_proxy: bool,
    ) -> Self {
        let url_service = UrlService::new(
            store.clone(),
            UrlValidator::new(settings.validation.clone()),
            &settings.keys,
        );
        let resolver_service = ResolverService::new(store, cache.clone(), click_sender.clone());

        Self {
            url_service: Arc::new(url_service),
            resolver_service: Arc::new(resolver_service),
            rate_limiter: Arc::new(SlidingWindowRateLimiter::new(settings.rate_limit.clone())),
            cache,
            click_sender,
            behind_proxy,
        }
    }
}
