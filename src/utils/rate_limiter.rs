//! Sliding-window request budget per client identifier.
//!
//! The limiter only counts what it is told about. Keyed by something the
//! client controls, it is an advisory UX affordance and does not prevent
//! abuse. The HTTP layer keys it by the connection's peer address (see
//! [`crate::api::middleware::rate_limit`]), which makes it authoritative for
//! this process only; several replicas each keep their own budget.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitSettings;

/// Per-client sliding-window limiter.
///
/// Each client owns a queue of accepted request instants. Rejected requests
/// are not recorded, so a client hammering the limit regains budget as soon
/// as its oldest accepted request leaves the window.
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    clients: DashMap<String, VecDeque<Instant>>,
    settings: RateLimitSettings,
}

impl SlidingWindowRateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            clients: DashMap::new(),
            settings,
        }
    }

    /// Checks the configured budget for `client_key` at the current instant.
    pub fn check(&self, client_key: &str) -> bool {
        self.can_make_request(
            client_key,
            self.settings.max_requests,
            self.settings.window(),
        )
    }

    /// Records and accepts a request if `client_key` has budget left.
    ///
    /// Returns `false` without recording anything once `max_requests`
    /// accepted requests fall inside the trailing `window`.
    pub fn can_make_request(&self, client_key: &str, max_requests: usize, window: Duration) -> bool {
        self.can_make_request_at(client_key, max_requests, window, Instant::now())
    }

    /// Same as [`Self::can_make_request`] with an explicit clock reading.
    pub fn can_make_request_at(
        &self,
        client_key: &str,
        max_requests: usize,
        window: Duration,
        now: Instant,
    ) -> bool {
        let mut requests = self.clients.entry(client_key.to_string()).or_default();

        while requests
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= window)
        {
            requests.pop_front();
        }

        if requests.len() >= max_requests {
            return false;
        }

        requests.push_back(now);
        true
    }

    /// Drops clients whose every request has left the configured window.
    ///
    /// Returns the number of clients removed.
    pub fn purge_idle(&self, now: Instant) -> usize {
        let window = self.settings.window();
        let before = self.clients.len();

        self.clients.retain(|_, requests| {
            requests
                .back()
                .is_some_and(|&t| now.saturating_duration_since(t) < window)
        });

        before.saturating_sub(self.clients.len())
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }
}
