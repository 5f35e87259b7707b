//! Value types passed into and out of the decay and band computations.
//!
//! Amounts and prices are `f64`; timestamps are Unix seconds (`i64`).
//! Every type here is a transient value object: constructed per evaluation,
//! never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DEFAULT_ANNUAL_RATE;
use crate::error::{ensure_finite, DecayError};

/// A balance subject to demurrage since its last activity.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DemurrageInput {
    /// Token balance before decay.
    pub principal: f64,
    /// Unix timestamp of the last activity on the balance.
    pub last_activity_timestamp: i64,
    /// Fractional annual decay rate in `[0, 1)`.
    pub annual_rate: f64,
}

impl DemurrageInput {
    /// Input at the default 2% annual rate.
    pub fn new(principal: f64, last_activity_timestamp: i64) -> Self {
        Self {
            principal,
            last_activity_timestamp,
            annual_rate: DEFAULT_ANNUAL_RATE,
        }
    }

    pub fn with_rate(mut self, annual_rate: f64) -> Self {
        self.annual_rate = annual_rate;
        self
    }

    /// Check the domain constraints and return the elapsed seconds at `now`.
    pub fn validate(&self, now: i64) -> Result<i64, DecayError> {
        let principal = ensure_finite("principal", self.principal)?;
        if principal < 0.0 {
            return Err(DecayError::invalid(format!(
                "principal must be >= 0, got {principal}"
            )));
        }
        validate_annual_rate(self.annual_rate)?;
        if now < self.last_activity_timestamp {
            return Err(DecayError::invalid(format!(
                "now ({now}) is before last activity ({})",
                self.last_activity_timestamp
            )));
        }
        // `now >= last` so the difference only overflows for spans beyond i64.
        now.checked_sub(self.last_activity_timestamp)
            .ok_or_else(|| DecayError::invalid("elapsed time overflows i64"))
    }
}

/// Check that an annual rate lies in `[0, 1)`.
pub fn validate_annual_rate(annual_rate: f64) -> Result<f64, DecayError> {
    let rate = ensure_finite("annual_rate", annual_rate)?;
    if !(0.0..1.0).contains(&rate) {
        return Err(DecayError::invalid(format!(
            "annual_rate must be in [0, 1), got {rate}"
        )));
    }
    Ok(rate)
}

/// Full result of a demurrage evaluation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DecayBreakdown {
    pub principal: f64,
    /// Balance remaining after decay.
    pub decayed_amount: f64,
    /// Amount removed by decay (`principal - decayed_amount`).
    pub decay_amount: f64,
    /// `exp(-rate * elapsed / year)`, in `(0, 1]`.
    pub multiplier: f64,
    pub elapsed_secs: i64,
}

/// A price observation to classify against a reference anchor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DeviationBandInput {
    /// Gold-pegged target anchor price.
    pub reference_price: f64,
    /// Observed token price.
    pub current_price: f64,
    /// Half-width of the band as a fraction of the reference (0.05 = ±5%).
    pub tolerance_fraction: f64,
}

impl DeviationBandInput {
    pub fn new(reference_price: f64, current_price: f64, tolerance_fraction: f64) -> Self {
        Self {
            reference_price,
            current_price,
            tolerance_fraction,
        }
    }

    pub fn validate(&self) -> Result<(), DecayError> {
        let reference = ensure_finite("reference_price", self.reference_price)?;
        let current = ensure_finite("current_price", self.current_price)?;
        let tolerance = ensure_finite("tolerance_fraction", self.tolerance_fraction)?;
        if reference <= 0.0 {
            return Err(DecayError::invalid(format!(
                "reference_price must be > 0, got {reference}"
            )));
        }
        if current <= 0.0 {
            return Err(DecayError::invalid(format!(
                "current_price must be > 0, got {current}"
            )));
        }
        validate_tolerance(tolerance)?;
        Ok(())
    }
}

/// Check that a tolerance fraction lies in `(0, 1)`.
pub fn validate_tolerance(tolerance_fraction: f64) -> Result<f64, DecayError> {
    let tolerance = ensure_finite("tolerance_fraction", tolerance_fraction)?;
    if tolerance <= 0.0 || tolerance >= 1.0 {
        return Err(DecayError::invalid(format!(
            "tolerance_fraction must be in (0, 1), got {tolerance}"
        )));
    }
    Ok(tolerance)
}

/// Economic regime of a price relative to its deviation band.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BandStatus {
    /// Price above the upper bound: penalty regime.
    Above,
    /// Price below the lower bound: reward regime.
    Below,
    /// Price inside the band, bounds included.
    Within,
}

impl BandStatus {
    /// Label shown by the presentation layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use caes_core::types::BandStatus;
    /// assert_eq!(BandStatus::Above.label(), "Above Band");
    /// assert_eq!(BandStatus::Below.label(), "Below Band");
    /// assert_eq!(BandStatus::Within.label(), "Optimal");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Self::Above => "Above Band",
            Self::Below => "Below Band",
            Self::Within => "Optimal",
        }
    }
}

impl fmt::Display for BandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Corrective incentive implied by a band classification.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", content = "rate", rename_all = "lowercase")]
pub enum Incentive {
    /// Reduce circulating amount; price is above the band.
    Penalty(f64),
    /// Encourage usage; price is below the band.
    Reward(f64),
    None,
}

/// Outcome of classifying a price against its deviation band.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DeviationBandResult {
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// `(current - reference) / reference * 100`.
    pub deviation_percentage: f64,
    pub status: BandStatus,
    /// Penalty or reward magnitude. Zero inside the band.
    pub rate: f64,
}

impl DeviationBandResult {
    pub fn incentive(&self) -> Incentive {
        match self.status {
            BandStatus::Above => Incentive::Penalty(self.rate),
            BandStatus::Below => Incentive::Reward(self.rate),
            BandStatus::Within => Incentive::None,
        }
    }

    /// Deviation as a signed fraction of the reference price.
    pub fn deviation_fraction(&self) -> f64 {
        self.deviation_percentage / 100.0
    }
}

/// Market conditions feeding the stability health score.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MarketIndicators {
    pub current_gold_price: f64,
    pub target_gold_price: f64,
    /// Volatility index in `[0, 1]`.
    pub market_volatility: f64,
    pub transaction_volume: f64,
    pub liquidity_depth: f64,
}

impl MarketIndicators {
    /// Signed deviation of the gold price from its target, as a fraction.
    pub fn gold_deviation(&self) -> Result<f64, DecayError> {
        let current = ensure_finite("current_gold_price", self.current_gold_price)?;
        let target = ensure_finite("target_gold_price", self.target_gold_price)?;
        for (name, price) in [("current_gold_price", current), ("target_gold_price", target)] {
            if price <= 0.0 {
                return Err(DecayError::invalid(format!("{name} must be > 0, got {price}")));
            }
        }
        Ok((current - target) / target)
    }

    /// Check every indicator and return the gold deviation.
    pub fn validate(&self) -> Result<f64, DecayError> {
        let gold_deviation = self.gold_deviation()?;
        let volatility = ensure_finite("market_volatility", self.market_volatility)?;
        let volume = ensure_finite("transaction_volume", self.transaction_volume)?;
        let liquidity = ensure_finite("liquidity_depth", self.liquidity_depth)?;
        if !(0.0..=1.0).contains(&volatility) {
            return Err(DecayError::invalid(format!(
                "market_volatility must be in [0, 1], got {volatility}"
            )));
        }
        if volume < 0.0 || liquidity < 0.0 {
            return Err(DecayError::invalid("volume and liquidity must be >= 0"));
        }
        Ok(gold_deviation)
    }
}

/// A `{current, reference}` price pair delivered by a price source.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PriceQuote {
    pub current_price: f64,
    pub reference_price: f64,
    /// Unix timestamp at which the source observed the prices.
    pub observed_at: i64,
}

impl PriceQuote {
    pub fn band_input(&self, tolerance_fraction: f64) -> DeviationBandInput {
        DeviationBandInput::new(self.reference_price, self.current_price, tolerance_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demurrage_input_defaults_to_two_percent() {
        let input = DemurrageInput::new(1000.0, 0);
        assert_eq!(input.annual_rate, 0.02);
        assert_eq!(input.with_rate(0.05).annual_rate, 0.05);
    }

    #[test]
    fn demurrage_validate_returns_elapsed() {
        let input = DemurrageInput::new(10.0, 1_000);
        assert_eq!(input.validate(1_000).unwrap(), 0);
        assert_eq!(input.validate(4_600).unwrap(), 3_600);
    }

    #[test]
    fn demurrage_validate_rejects_out_of_domain() {
        assert!(DemurrageInput::new(-1.0, 0).validate(0).is_err());
        assert!(DemurrageInput::new(1.0, 0).with_rate(1.0).validate(0).is_err());
        assert!(DemurrageInput::new(1.0, 0).with_rate(-0.01).validate(0).is_err());
        assert!(DemurrageInput::new(1.0, 10).validate(9).is_err());
        assert!(DemurrageInput::new(f64::NAN, 0).validate(0).is_err());
    }

    #[test]
    fn demurrage_validate_rejects_overflowing_span() {
        let input = DemurrageInput::new(1.0, i64::MIN);
        assert!(matches!(input.validate(i64::MAX), Err(DecayError::InvalidInput(_))));
    }

    #[test]
    fn band_input_validation() {
        assert!(DeviationBandInput::new(100.0, 100.0, 0.05).validate().is_ok());
        assert!(DeviationBandInput::new(0.0, 100.0, 0.05).validate().is_err());
        assert!(DeviationBandInput::new(100.0, -1.0, 0.05).validate().is_err());
        assert!(DeviationBandInput::new(100.0, 100.0, 0.0).validate().is_err());
        assert!(DeviationBandInput::new(100.0, 100.0, 1.0).validate().is_err());
        assert!(DeviationBandInput::new(100.0, f64::INFINITY, 0.05).validate().is_err());
    }

    #[test]
    fn status_labels_and_display() {
        assert_eq!(BandStatus::Within.to_string(), "Optimal");
        assert_eq!(format!("{}", BandStatus::Above), "Above Band");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&BandStatus::Below).unwrap();
        assert_eq!(json, "\"below\"");
    }

    #[test]
    fn incentive_follows_status() {
        let mut result = DeviationBandResult {
            lower_bound: 1900.0,
            upper_bound: 2100.0,
            deviation_percentage: 10.0,
            status: BandStatus::Above,
            rate: 0.05,
        };
        assert_eq!(result.incentive(), Incentive::Penalty(0.05));
        result.status = BandStatus::Below;
        assert_eq!(result.incentive(), Incentive::Reward(0.05));
        result.status = BandStatus::Within;
        assert_eq!(result.incentive(), Incentive::None);
        assert!((result.deviation_fraction() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn incentive_json_shape() {
        let json = serde_json::to_value(Incentive::Reward(0.25)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "reward", "rate": 0.25}));
    }

    #[test]
    fn gold_deviation_signed() {
        let indicators = MarketIndicators {
            current_gold_price: 88.2,
            target_gold_price: 84.0,
            market_volatility: 0.2,
            transaction_volume: 0.0,
            liquidity_depth: 0.0,
        };
        assert!((indicators.gold_deviation().unwrap() - 0.05).abs() < 1e-12);
        let bad = MarketIndicators {
            target_gold_price: 0.0,
            ..indicators
        };
        assert!(bad.gold_deviation().is_err());
        for price in [0.0, -84.0] {
            let bad = MarketIndicators {
                current_gold_price: price,
                ..indicators
            };
            assert!(matches!(bad.gold_deviation(), Err(DecayError::InvalidInput(_))));
        }
    }

    #[test]
    fn indicators_validate_ranges() {
        let ok = MarketIndicators {
            current_gold_price: 84.0,
            target_gold_price: 84.0,
            market_volatility: 1.0,
            transaction_volume: 0.0,
            liquidity_depth: 0.0,
        };
        assert_eq!(ok.validate().unwrap(), 0.0);
        assert!(MarketIndicators { market_volatility: -0.1, ..ok }.validate().is_err());
        assert!(MarketIndicators { transaction_volume: -1.0, ..ok }.validate().is_err());
        assert!(MarketIndicators { liquidity_depth: f64::NAN, ..ok }.validate().is_err());
    }

    #[test]
    fn quote_to_band_input() {
        let quote = PriceQuote {
            current_price: 2200.0,
            reference_price: 2000.0,
            observed_at: 1_700_000_000,
        };
        let input = quote.band_input(0.05);
        assert_eq!(input.reference_price, 2000.0);
        assert_eq!(input.current_price, 2200.0);
        assert_eq!(input.tolerance_fraction, 0.05);
    }
}
