//! Shared test helpers for scenario and property tests.

use caes_core::constants::SECONDS_PER_YEAR;
use caes_core::types::{DemurrageInput, DeviationBandInput, DeviationBandResult, PriceQuote};

/// Fixed reference epoch (2023-11-14T22:13:20Z).
pub const T0: i64 = 1_700_000_000;

/// Absolute-tolerance float comparison.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// A balance last active at [`T0`] with the given annual rate.
pub fn balance(principal: f64, annual_rate: f64) -> DemurrageInput {
    DemurrageInput::new(principal, T0).with_rate(annual_rate)
}

/// `years` after [`T0`], rounded down to whole seconds.
pub fn years_after_t0(years: f64) -> i64 {
    T0 + (years * SECONDS_PER_YEAR as f64) as i64
}

/// Classify with the default coefficients, panicking on invalid input.
pub fn classify(reference: f64, current: f64, tolerance: f64) -> DeviationBandResult {
    caes_decay::classify(&DeviationBandInput::new(reference, current, tolerance))
        .expect("valid band input")
}

pub fn quote(reference_price: f64, current_price: f64) -> PriceQuote {
    PriceQuote {
        current_price,
        reference_price,
        observed_at: T0,
    }
}
