//! Trait interfaces for the CAES engine.
//!
//! These traits define the contracts between crates:
//! - [`DecayCalculator`]: demurrage math (caes-decay implements)
//! - [`BandClassifier`]: peg deviation classification (caes-decay implements)
//! - [`PriceSource`]: external price feed (injected by the caller; caes-monitor consumes)

use async_trait::async_trait;

use crate::error::{DecayError, PriceFeedError};
use crate::types::{DecayBreakdown, DemurrageInput, DeviationBandInput, DeviationBandResult, PriceQuote};

/// Pure computation of demurrage.
///
/// Implementations must be referentially transparent: the same input and
/// `now` always give the same output.
pub trait DecayCalculator: Send + Sync {
    /// Balance remaining after decaying `input.principal` from its last activity until `now`.
    fn compute_decayed_amount(&self, input: &DemurrageInput, now: i64) -> Result<f64, DecayError>;

    /// Amount removed by decay between the last activity and `now`.
    ///
    /// Default implementation: `principal - compute_decayed_amount(...)`.
    fn compute_decay(&self, input: &DemurrageInput, now: i64) -> Result<f64, DecayError> {
        let decayed = self.compute_decayed_amount(input, now)?;
        Ok((input.principal - decayed).max(0.0))
    }

    /// Decayed amount together with the multiplier and elapsed time.
    fn breakdown(&self, input: &DemurrageInput, now: i64) -> Result<DecayBreakdown, DecayError>;
}

/// Pure classification of a price against a deviation band.
pub trait BandClassifier: Send + Sync {
    fn classify(&self, input: &DeviationBandInput) -> Result<DeviationBandResult, DecayError>;
}

/// External supplier of `{current, reference}` price pairs.
///
/// Retry and caching policy belong to the implementation; callers treat each
/// `fetch` as a single attempt.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<PriceQuote, PriceFeedError>;

    /// Human-readable name used in logs.
    fn name(&self) -> &str {
        "price-source"
    }
}
