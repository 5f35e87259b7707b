//! Monitor configuration.

use std::time::Duration;

use caes_core::config::{BandConfig, MonitorSettings};
use caes_core::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_STALE_AFTER_FAILURES,
    DEFAULT_TOLERANCE_FRACTION,
};

/// Runtime configuration for a [`BandMonitor`](crate::BandMonitor).
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between price polls.
    pub poll_interval: Duration,
    /// Upper bound on a single fetch before it counts as a failure.
    pub fetch_timeout: Duration,
    /// Consecutive failures before the last good reading is published as stale.
    pub stale_after_failures: u32,
    /// Band half-width applied to every quote.
    pub tolerance_fraction: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            stale_after_failures: DEFAULT_STALE_AFTER_FAILURES,
            tolerance_fraction: DEFAULT_TOLERANCE_FRACTION,
        }
    }
}

impl MonitorConfig {
    /// Build from the file-level settings and band parameters.
    pub fn from_settings(settings: &MonitorSettings, band: &BandConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            fetch_timeout: Duration::from_secs(settings.fetch_timeout_secs),
            stale_after_failures: settings.stale_after_failures,
            tolerance_fraction: band.tolerance_fraction,
        }
    }
}
