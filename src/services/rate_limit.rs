//! Per-client admission control for the draft endpoint
//!
//! Uses a fixed-window counter with in-memory storage.
//! Windows are stored per client identity and replaced wholesale once expired.
//! Nothing is shared across processes, so the ceiling applies per instance.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::constants::{
    DEFAULT_RATE_LIMIT_MAX_IDENTITIES, DEFAULT_RATE_LIMIT_MAX_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECS,
};
use crate::domain::client_identity::ClientIdentity;

/// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub allowed: bool,
    /// Requests left in the current window after this one
    pub remaining: u32,
}

/// Admission gate consulted before any request parsing.
///
/// The in-memory [`FixedWindowLimiter`] is the only implementation here; a
/// shared counter store can slot in behind the same trait.
#[async_trait]
pub trait AdmissionControl: Send + Sync {
    async fn check(&self, identity: &ClientIdentity) -> AdmissionDecision;

    /// Drop expired state. Returns how many identities were removed.
    async fn sweep(&self) -> usize;

    /// Hint sent back to rejected clients.
    fn retry_after(&self) -> Duration;
}

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
    /// Maximum number of identities held at once
    pub max_identities: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            max_identities: DEFAULT_RATE_LIMIT_MAX_IDENTITIES,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    reset_at: Instant,
}

impl RateWindow {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// Per-identity rate limiter using fixed windows
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<ClientIdentity, RateWindow>>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of identities currently tracked
    pub fn tracked(&self) -> usize {
        self.windows.lock().len()
    }

    pub(crate) fn check_at(&self, identity: &ClientIdentity, now: Instant) -> AdmissionDecision {
        let ceiling = self.config.max_requests;
        let fresh = RateWindow {
            count: 1,
            reset_at: now + self.config.window,
        };
        let mut windows = self.windows.lock();

        if let Some(window) = windows.get_mut(identity) {
            if window.is_expired(now) {
                *window = fresh;
            } else if window.count >= ceiling {
                return AdmissionDecision {
                    allowed: false,
                    remaining: 0,
                };
            } else {
                window.count += 1;
                return AdmissionDecision {
                    allowed: true,
                    remaining: ceiling - window.count,
                };
            }
        } else {
            if windows.len() >= self.config.max_identities {
                make_room(&mut windows, self.config.max_identities, now);
            }
            windows.insert(identity.clone(), fresh);
        }

        AdmissionDecision {
            allowed: true,
            remaining: ceiling.saturating_sub(1),
        }
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, window| !window.is_expired(now));
        before - windows.len()
    }
}

/// Free one slot at capacity: expired windows go first, then the window
/// closest to its reset.
fn make_room(windows: &mut HashMap<ClientIdentity, RateWindow>, max: usize, now: Instant) {
    windows.retain(|_, window| !window.is_expired(now));
    if windows.len() < max {
        return;
    }
    let victim = windows
        .iter()
        .min_by_key(|(_, window)| window.reset_at)
        .map(|(identity, _)| identity.clone());
    if let Some(victim) = victim {
        windows.remove(&victim);
    }
}

#[async_trait]
impl AdmissionControl for FixedWindowLimiter {
    async fn check(&self, identity: &ClientIdentity) -> AdmissionDecision {
        self.check_at(identity, Instant::now())
    }

    async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn retry_after(&self) -> Duration {
        self.config.window
    }
}

/// Periodically sweep expired windows so idle identities don't pile up.
pub async fn start_sweeper(admission: Arc<dyn AdmissionControl>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        let removed = admission.sweep().await;
        if removed > 0 {
            tracing::debug!(removed, "[sweeper] dropped expired rate-limit windows");
        }
    }
}
