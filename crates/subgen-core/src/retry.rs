//! Retry configuration and backoff calculation.
//!
//! Sync-only building blocks; the async sleep loops live in the client
//! crates which have tokio available.

use std::time::Duration;

use rand::Rng;

/// Default maximum retries for a provider call.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
/// Default jitter factor (0.0–1.0).
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// Configuration for bounded retries of transient provider errors.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum retry attempts after the initial call.
    pub max_retries: u32,
    /// Base delay for exponential backoff in ms.
    pub base_delay_ms: u64,
    /// Cap on the delay between retries in ms.
    pub max_delay_ms: u64,
    /// Jitter factor 0.0–1.0, applied symmetrically.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

/// Calculate the backoff delay before retry `attempt` (0-based).
///
/// Formula: `min(max_delay, base_delay * 2^attempt)` scaled by a random
/// jitter in `[1 - jitter, 1 + jitter]`.
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exp = config
        .base_delay_ms
        .saturating_mul(1_u64.checked_shl(attempt).unwrap_or(u64::MAX))
        .min(config.max_delay_ms);

    let jitter = config.jitter_factor.clamp(0.0, 1.0);
    let scale = if jitter > 0.0 {
        1.0 + rand::rng().random_range(-jitter..=jitter)
    } else {
        1.0
    };

    Duration::from_millis((exp as f64 * scale) as u64)
}
