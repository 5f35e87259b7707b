//! Tunable parameters for the decay engine, band classifier and monitor.
//!
//! All structs deserialize with per-field defaults so a partial config file
//! only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ANNUAL_RATE, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_PENALTY_COEFFICIENT,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REWARD_COEFFICIENT, DEFAULT_STALE_AFTER_FAILURES,
    DEFAULT_TOLERANCE_FRACTION,
};
use crate::error::{ensure_finite, CaesError, DecayError};
use crate::types::{validate_annual_rate, validate_tolerance};

/// Demurrage parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct DecayConfig {
    /// Fractional annual decay rate in `[0, 1)`.
    pub annual_rate: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            annual_rate: DEFAULT_ANNUAL_RATE,
        }
    }
}

impl DecayConfig {
    pub fn validate(&self) -> Result<(), DecayError> {
        validate_annual_rate(self.annual_rate).map(|_| ())
    }
}

/// Deviation band parameters.
///
/// The penalty (reward) rate is `coefficient * distance / reference`, where
/// `distance` is how far the price lies above (below) the band.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BandConfig {
    pub tolerance_fraction: f64,
    pub penalty_coefficient: f64,
    pub reward_coefficient: f64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            tolerance_fraction: DEFAULT_TOLERANCE_FRACTION,
            penalty_coefficient: DEFAULT_PENALTY_COEFFICIENT,
            reward_coefficient: DEFAULT_REWARD_COEFFICIENT,
        }
    }
}

impl BandConfig {
    pub fn validate(&self) -> Result<(), DecayError> {
        validate_tolerance(self.tolerance_fraction)?;
        for (name, value) in [
            ("penalty_coefficient", self.penalty_coefficient),
            ("reward_coefficient", self.reward_coefficient),
        ] {
            // Must be strictly positive so the rate grows with distance.
            if ensure_finite(name, value)? <= 0.0 {
                return Err(DecayError::invalid(format!("{name} must be > 0, got {value}")));
            }
        }
        Ok(())
    }
}

/// Price polling parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorSettings {
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Consecutive failures before the last good snapshot is reported stale.
    pub stale_after_failures: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            stale_after_failures: DEFAULT_STALE_AFTER_FAILURES,
        }
    }
}

impl MonitorSettings {
    pub fn validate(&self) -> Result<(), DecayError> {
        if self.poll_interval_secs == 0 {
            return Err(DecayError::invalid("poll_interval_secs must be > 0"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(DecayError::invalid("fetch_timeout_secs must be > 0"));
        }
        if self.stale_after_failures == 0 {
            return Err(DecayError::invalid("stale_after_failures must be > 0"));
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct CaesConfig {
    pub decay: DecayConfig,
    pub band: BandConfig,
    pub monitor: MonitorSettings,
}

impl CaesConfig {
    /// Validate every section, reporting the first failure as
    /// [`CaesError::Config`] prefixed with its section name.
    pub fn validate(&self) -> Result<(), CaesError> {
        let section = |name: &'static str| {
            move |e: DecayError| CaesError::Config(format!("[{name}] {e}"))
        };
        self.decay.validate().map_err(section("decay"))?;
        self.band.validate().map_err(section("band"))?;
        self.monitor.validate().map_err(section("monitor"))
    }
}
