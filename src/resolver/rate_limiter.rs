//! Jittered request spacing
//!
//! Every outbound operation of the resolver passes through [`RateLimiter::throttle`],
//! which keeps consecutive request starts at least `request_delay` apart and
//! redraws that delay after each call so the request cadence is not a fixed
//! fingerprint.

use crate::config::settings::RateLimitSettings;
use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Debug)]
struct RateLimiterState {
    /// Start of the previous gated call
    last_request: Option<Instant>,
    /// Minimum gap before the next call may start
    request_delay: Duration,
}

/// Serializing rate limiter shared by all resolver operations.
///
/// The state lock is held across the wait, so concurrent callers queue up and
/// each one observes the start time recorded by its predecessor.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<RateLimiterState>,
    min_delay_secs: f64,
    max_delay_secs: f64,
}

impl RateLimiter {
    /// Create a limiter with an initial delay and a redraw range in seconds
    pub fn new(initial_delay_secs: f64, min_delay_secs: f64, max_delay_secs: f64) -> Self {
        let min = min_delay_secs.max(0.0);
        let max = max_delay_secs.max(min);
        Self {
            state: Mutex::new(RateLimiterState {
                last_request: None,
                request_delay: Duration::from_secs_f64(initial_delay_secs.max(0.0)),
            }),
            min_delay_secs: min,
            max_delay_secs: max,
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.initial_delay_secs,
            settings.min_delay_secs,
            settings.max_delay_secs,
        )
    }

    /// Wait until the current delay has passed since the previous call
    /// started, then record this call's start and redraw the delay.
    pub async fn throttle(&self) {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_request {
            let elapsed = last.elapsed();
            if elapsed < state.request_delay {
                let wait = state.request_delay - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        state.last_request = Some(Instant::now());
        state.request_delay = self.draw_delay();
    }

    /// Delay the next call will be held to
    pub async fn current_delay(&self) -> Duration {
        self.state.lock().await.request_delay
    }

    fn draw_delay(&self) -> Duration {
        let secs = rand::rng().random_range(self.min_delay_secs..=self.max_delay_secs);
        Duration::from_secs_f64(secs)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_settings(&RateLimitSettings::default())
    }
}
