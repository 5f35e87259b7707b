//! Error types for the CAES engine.
use thiserror::Error;

/// Errors from the pure decay and classification math.
///
/// The only failure mode is an out-of-domain argument; the math performs no I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecayError {
    #[error("invalid input: {0}")] InvalidInput(String),
}

impl DecayError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Failures of an external price feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceFeedError {
    #[error("price fetch timed out")] Timeout,
    #[error("malformed quote: {0}")] Malformed(String),
    #[error("price source unavailable: {0}")] Unavailable(String),
}

#[derive(Error, Debug)]
pub enum CaesError {
    #[error(transparent)] Decay(#[from] DecayError),
    #[error(transparent)] PriceFeed(#[from] PriceFeedError),
    #[error("config: {0}")] Config(String),
}

/// Reject NaN and infinities before any range check.
pub fn ensure_finite(name: &str, value: f64) -> Result<f64, DecayError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DecayError::invalid(format!("{name} must be finite, got {value}")))
    }
}
