//! Peg stabilization policy: tiered fee adjustments and market health grading.
//!
//! The fee adjustment for a transfer depends on how far the token has drifted
//! from its gold reference (`deviation = (current - reference) / reference`):
//!
//! | `|deviation|`    | adjustment (sign follows the deviation)            |
//! |------------------|----------------------------------------------------|
//! | `> 0.18`         | `amount * (|d| - 0.18) / 0.02 * 0.02` (emergency)  |
//! | `> 0.10`         | `amount * (|d| - 0.05) / 0.05 * 0.005` (moderate)  |
//! | `< 0.03`         | `-amount * 0.0005` (stagnant: small discount)      |
//! | otherwise        | `amount * d * 0.001`                               |
//!
//! The result is always clamped to `±2%` of the amount. A positive value is a
//! surcharge (price too high, slow buying); a negative value is a discount.
//! [`market_adjustment`] adds volume, volatility and liquidity terms before
//! the same clamp.

use serde::{Deserialize, Serialize};
use std::fmt;

use caes_core::constants::{
    EMERGENCY_DEVIATION, EMERGENCY_RAMP, EMERGENCY_THROTTLE_RATE, HEALTH_LIQUIDITY_UNIT,
    HEALTH_MAX, HEALTH_VOLUME_UNIT, HEALTH_WEIGHT_GOLD, HEALTH_WEIGHT_LIQUIDITY,
    HEALTH_WEIGHT_VOLATILITY, HEALTH_WEIGHT_VOLUME, HIGH_LIQUIDITY_DEPTH,
    HIGH_LIQUIDITY_DISCOUNT, HIGH_VOLATILITY, HIGH_VOLUME_THRESHOLD, LIQUIDITY_STRESS_RATE,
    LOW_LIQUIDITY_DEPTH, LOW_VOLATILITY, LOW_VOLATILITY_DISCOUNT, LOW_VOLUME_DISCOUNT,
    LOW_VOLUME_THRESHOLD, MAX_STABILIZATION_ADJUSTMENT, MODERATE_BASELINE, MODERATE_DEVIATION,
    MODERATE_THROTTLE_RATE, NORMAL_ADJUSTMENT_SLOPE, STAGNANT_DEVIATION, STAGNANT_DISCOUNT,
    VOLATILITY_SURCHARGE_RATE, VOLUME_THROTTLE_BASELINE, VOLUME_THROTTLE_RATE,
    VOLUME_THROTTLE_UNIT,
};
use caes_core::error::{ensure_finite, DecayError};
use caes_core::types::{DeviationBandResult, MarketIndicators};

/// Signed fee adjustment for transferring `amount` at the given peg deviation.
pub fn stabilization_adjustment(amount: f64, deviation: f64) -> Result<f64, DecayError> {
    let amount = validate_amount(amount)?;
    let deviation = ensure_finite("deviation", deviation)?;
    Ok(clamp_to_cap(amount, deviation_term(amount, deviation)))
}

/// Fee adjustment for `amount` at the deviation of an existing classification.
pub fn adjustment_for_band(amount: f64, band: &DeviationBandResult) -> Result<f64, DecayError> {
    stabilization_adjustment(amount, band.deviation_fraction())
}

/// Fee adjustment that also responds to market activity.
///
/// Sums the deviation tier at the indicators' gold deviation with three
/// market terms, then clamps the total to `±2%` of `amount`:
///
/// | indicator      | condition   | term                                           |
/// |----------------|-------------|------------------------------------------------|
/// | volume `v`     | `> 1e6`     | `amount * (v - 5e5) / 1e6 * 0.003`             |
/// |                | `< 1e5`     | `-amount * 0.001`                              |
/// | volatility `s` | `> 0.3`     | `amount * s * 0.005`                           |
/// |                | `< 0.1`     | `-amount * 0.001`                              |
/// | liquidity `l`  | `< 1e5`     | `amount * (1e5 - l) / 1e5 * 0.01`              |
/// |                | `> 1e6`     | `-amount * 0.0005`                             |
///
/// Indicators between the thresholds contribute nothing.
pub fn market_adjustment(amount: f64, indicators: &MarketIndicators) -> Result<f64, DecayError> {
    let amount = validate_amount(amount)?;
    let gold_deviation = indicators.validate()?;

    let total = deviation_term(amount, gold_deviation)
        + volume_term(amount, indicators.transaction_volume)
        + volatility_term(amount, indicators.market_volatility)
        + liquidity_term(amount, indicators.liquidity_depth);
    Ok(clamp_to_cap(amount, total))
}

fn validate_amount(amount: f64) -> Result<f64, DecayError> {
    let amount = ensure_finite("amount", amount)?;
    if amount < 0.0 {
        return Err(DecayError::invalid(format!("amount must be >= 0, got {amount}")));
    }
    Ok(amount)
}

fn clamp_to_cap(amount: f64, raw: f64) -> f64 {
    let cap = amount * MAX_STABILIZATION_ADJUSTMENT;
    raw.clamp(-cap, cap)
}

fn deviation_term(amount: f64, deviation: f64) -> f64 {
    let magnitude = deviation.abs();
    let direction = if deviation > 0.0 { 1.0 } else { -1.0 };

    if magnitude > EMERGENCY_DEVIATION {
        let factor = (magnitude - EMERGENCY_DEVIATION) / EMERGENCY_RAMP;
        amount * factor * EMERGENCY_THROTTLE_RATE * direction
    } else if magnitude > MODERATE_DEVIATION {
        let factor = (magnitude - MODERATE_BASELINE) / MODERATE_BASELINE;
        amount * factor * MODERATE_THROTTLE_RATE * direction
    } else if magnitude < STAGNANT_DEVIATION {
        -amount * STAGNANT_DISCOUNT
    } else {
        amount * deviation * NORMAL_ADJUSTMENT_SLOPE
    }
}

fn volume_term(amount: f64, volume: f64) -> f64 {
    if volume > HIGH_VOLUME_THRESHOLD {
        let factor = (volume - VOLUME_THROTTLE_BASELINE) / VOLUME_THROTTLE_UNIT;
        amount * factor * VOLUME_THROTTLE_RATE
    } else if volume < LOW_VOLUME_THRESHOLD {
        -amount * LOW_VOLUME_DISCOUNT
    } else {
        0.0
    }
}

fn volatility_term(amount: f64, volatility: f64) -> f64 {
    if volatility > HIGH_VOLATILITY {
        amount * volatility * VOLATILITY_SURCHARGE_RATE
    } else if volatility < LOW_VOLATILITY {
        -amount * LOW_VOLATILITY_DISCOUNT
    } else {
        0.0
    }
}

fn liquidity_term(amount: f64, depth: f64) -> f64 {
    if depth < LOW_LIQUIDITY_DEPTH {
        let stress = (LOW_LIQUIDITY_DEPTH - depth) / LOW_LIQUIDITY_DEPTH;
        amount * stress * LIQUIDITY_STRESS_RATE
    } else if depth > HIGH_LIQUIDITY_DEPTH {
        -amount * HIGH_LIQUIDITY_DISCOUNT
    } else {
        0.0
    }
}

/// Weighted market health on `0..=10`.
///
/// Components (each `0..=10`): gold peg closeness, inverse volatility,
/// transaction volume per million and liquidity depth per hundred thousand.
pub fn health_score(indicators: &MarketIndicators) -> Result<f64, DecayError> {
    let gold_deviation = indicators.validate()?;
    let volatility = indicators.market_volatility;
    let volume = indicators.transaction_volume;
    let liquidity = indicators.liquidity_depth;

    let gold = (1.0 - gold_deviation.abs()).max(0.0) * HEALTH_MAX;
    let calm = (1.0 - volatility) * HEALTH_MAX;
    let activity = (volume / HEALTH_VOLUME_UNIT).min(HEALTH_MAX);
    let depth = (liquidity / HEALTH_LIQUIDITY_UNIT).min(HEALTH_MAX);

    Ok(gold * HEALTH_WEIGHT_GOLD
        + calm * HEALTH_WEIGHT_VOLATILITY
        + activity * HEALTH_WEIGHT_VOLUME
        + depth * HEALTH_WEIGHT_LIQUIDITY)
}

/// Letter grade for a `0..=100` stability score.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StabilityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    D,
    F,
}

impl StabilityGrade {
    /// Grade thresholds in descending order; anything below the last is `F`.
    const THRESHOLDS: [(f64, Self); 10] = [
        (85.0, Self::APlus),
        (80.0, Self::A),
        (75.0, Self::AMinus),
        (70.0, Self::BPlus),
        (65.0, Self::B),
        (60.0, Self::BMinus),
        (55.0, Self::CPlus),
        (50.0, Self::C),
        (45.0, Self::CMinus),
        (40.0, Self::D),
    ];

    pub fn from_score(score: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Self::F)
    }

    /// Grade a [`health_score`] by scaling it onto `0..=100`.
    pub fn from_health(health: f64) -> Self {
        Self::from_score(health * 10.0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Fee adjustment fraction: discounts for healthy markets, premiums for weak ones.
    pub fn recommended_fee_adjustment(&self) -> f64 {
        match self {
            Self::APlus => -0.008,
            Self::A | Self::AMinus => -0.006,
            Self::BPlus | Self::B => -0.004,
            Self::BMinus | Self::CPlus => -0.002,
            Self::C => 0.0,
            Self::CMinus | Self::D => 0.002,
            Self::F => 0.005,
        }
    }
}

impl fmt::Display for StabilityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
