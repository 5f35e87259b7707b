//! Gold-peg deviation band classifier implementing [`BandClassifier`].
//!
//! A price is `Above` its band when strictly greater than the upper bound,
//! `Below` when strictly less than the lower bound and `Within` otherwise.
//! Bounds are inclusive. The incentive rate is linear in the normalised
//! distance outside the band:
//!
//! ```text
//! above:  rate = penalty_coefficient * (current - upper) / reference
//! below:  rate = reward_coefficient  * (lower - current) / reference
//! within: rate = 0
//! ```

use caes_core::config::BandConfig;
use caes_core::error::DecayError;
use caes_core::traits::BandClassifier;
use caes_core::types::{BandStatus, DeviationBandInput, DeviationBandResult};
use tracing::trace;

/// Classifier with configurable tolerance and rate coefficients.
#[derive(Debug, Clone, Default)]
pub struct PegBandClassifier {
    config: BandConfig,
}

impl PegBandClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BandConfig) -> Result<Self, DecayError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BandConfig {
        &self.config
    }

    /// Classify `current_price` using the configured tolerance.
    pub fn classify_price(
        &self,
        reference_price: f64,
        current_price: f64,
    ) -> Result<DeviationBandResult, DecayError> {
        let input =
            DeviationBandInput::new(reference_price, current_price, self.config.tolerance_fraction);
        self.classify(&input)
    }
}

impl BandClassifier for PegBandClassifier {
    fn classify(&self, input: &DeviationBandInput) -> Result<DeviationBandResult, DecayError> {
        input.validate()?;

        let reference = input.reference_price;
        let current = input.current_price;

        // `reference ± reference * tol` keeps decimal boundaries exact
        // (100 ± 5 rather than 100 * 1.05 = 105.00000000000001).
        let half_width = reference * input.tolerance_fraction;
        let lower_bound = reference - half_width;
        let upper_bound = reference + half_width;

        let deviation_percentage = (current - reference) / reference * 100.0;

        let (status, rate) = if current > upper_bound {
            let distance = (current - upper_bound) / reference;
            (BandStatus::Above, self.config.penalty_coefficient * distance)
        } else if current < lower_bound {
            let distance = (lower_bound - current) / reference;
            (BandStatus::Below, self.config.reward_coefficient * distance)
        } else {
            (BandStatus::Within, 0.0)
        };

        trace!(reference, current, %status, rate, "price classified");

        Ok(DeviationBandResult {
            lower_bound,
            upper_bound,
            deviation_percentage,
            status,
            rate,
        })
    }
}

/// Classify with the default rate coefficients.
///
/// # Examples
///
/// ```
/// use caes_core::types::{BandStatus, DeviationBandInput};
/// use caes_decay::classify;
///
/// let result = classify(&DeviationBandInput::new(2000.0, 2200.0, 0.05)).unwrap();
/// assert_eq!(result.status, BandStatus::Above);
/// assert_eq!(result.upper_bound, 2100.0);
/// assert!(result.rate > 0.0);
/// ```
pub fn classify(input: &DeviationBandInput) -> Result<DeviationBandResult, DecayError> {
    PegBandClassifier::default().classify(input)
}
