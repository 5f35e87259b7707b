//! Demurrage engine implementing the [`DecayCalculator`] trait.
//!
//! Decay is continuously compounded: a balance idle for `t` seconds at annual
//! rate `r` retains `exp(-r * t / SECONDS_PER_YEAR)` of its value.

use caes_core::config::DecayConfig;
use caes_core::constants::SECONDS_PER_YEAR;
use caes_core::error::DecayError;
use caes_core::traits::DecayCalculator;
use caes_core::types::{validate_annual_rate, DecayBreakdown, DemurrageInput};
use tracing::trace;

/// Smallest positive `f64`; a positive balance never decays past it.
const MIN_POSITIVE_AMOUNT: f64 = f64::from_bits(1);

/// The production demurrage calculator.
///
/// Carries a [`DecayConfig`] whose rate is used by
/// [`decayed_balance`](Self::decayed_balance). The [`DecayCalculator`]
/// methods take the rate from each input instead.
#[derive(Debug, Clone, Default)]
pub struct DemurrageEngine {
    config: DecayConfig,
}

impl DemurrageEngine {
    /// Engine at the default 2% annual rate.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecayConfig) -> Result<Self, DecayError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    /// Decay `principal` at the configured rate from `last_activity` to `now`.
    pub fn decayed_balance(
        &self,
        principal: f64,
        last_activity: i64,
        now: i64,
    ) -> Result<f64, DecayError> {
        let input = DemurrageInput::new(principal, last_activity).with_rate(self.config.annual_rate);
        self.compute_decayed_amount(&input, now)
    }

    /// Half-life of a balance at the configured rate, in seconds.
    pub fn half_life_secs(&self) -> Result<Option<f64>, DecayError> {
        half_life_secs(self.config.annual_rate)
    }
}

/// Fraction of value retained after `elapsed_secs` at `annual_rate`.
///
/// Returns exactly `1.0` when either argument is zero and a value in `(0, 1]`
/// otherwise.
pub fn decay_multiplier(annual_rate: f64, elapsed_secs: i64) -> Result<f64, DecayError> {
    let rate = validate_annual_rate(annual_rate)?;
    if elapsed_secs < 0 {
        return Err(DecayError::invalid(format!(
            "elapsed_secs must be >= 0, got {elapsed_secs}"
        )));
    }
    if rate == 0.0 || elapsed_secs == 0 {
        return Ok(1.0);
    }

    let years = elapsed_secs as f64 / SECONDS_PER_YEAR as f64;
    let multiplier = (-rate * years).exp();

    // exp underflows to 0 after ~745 e-folds; keep the multiplier positive.
    Ok(multiplier.clamp(f64::MIN_POSITIVE, 1.0))
}

/// Balance remaining after decaying `input` from its last activity until `now`.
///
/// # Examples
///
/// ```
/// use caes_core::types::DemurrageInput;
/// use caes_decay::compute_decayed_amount;
///
/// let input = DemurrageInput::new(1000.0, 0).with_rate(0.02);
/// let one_year_later = compute_decayed_amount(&input, 31_536_000).unwrap();
/// assert!((one_year_later - 980.199).abs() < 1e-3);
/// ```
pub fn compute_decayed_amount(input: &DemurrageInput, now: i64) -> Result<f64, DecayError> {
    let elapsed = input.validate(now)?;
    let multiplier = decay_multiplier(input.annual_rate, elapsed)?;
    Ok(apply_multiplier(input.principal, multiplier))
}

/// Half-life in seconds, or `None` when the rate is zero and nothing decays.
pub fn half_life_secs(annual_rate: f64) -> Result<Option<f64>, DecayError> {
    let rate = validate_annual_rate(annual_rate)?;
    if rate == 0.0 {
        return Ok(None);
    }
    Ok(Some(std::f64::consts::LN_2 * SECONDS_PER_YEAR as f64 / rate))
}

fn apply_multiplier(principal: f64, multiplier: f64) -> f64 {
    if principal == 0.0 {
        return 0.0;
    }
    // Invariant: 0 < decayed <= principal.
    (principal * multiplier).clamp(MIN_POSITIVE_AMOUNT, principal)
}

impl DecayCalculator for DemurrageEngine {
    fn compute_decayed_amount(&self, input: &DemurrageInput, now: i64) -> Result<f64, DecayError> {
        compute_decayed_amount(input, now)
    }

    fn breakdown(&self, input: &DemurrageInput, now: i64) -> Result<DecayBreakdown, DecayError> {
        let elapsed_secs = input.validate(now)?;
        let multiplier = decay_multiplier(input.annual_rate, elapsed_secs)?;
        let decayed_amount = apply_multiplier(input.principal, multiplier);
        trace!(
            principal = input.principal,
            elapsed_secs,
            multiplier,
            "demurrage evaluated"
        );
        Ok(DecayBreakdown {
            principal: input.principal,
            decayed_amount,
            decay_amount: input.principal - decayed_amount,
            multiplier,
            elapsed_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: i64 = 1_700_000_000;
    const DAY: i64 = 24 * 3600;

    fn engine() -> DemurrageEngine {
        DemurrageEngine::new()
    }

    // --- decay_multiplier ---

    #[test]
    fn multiplier_is_one_at_zero_elapsed() {
        assert_eq!(decay_multiplier(0.02, 0).unwrap(), 1.0);
        assert_eq!(decay_multiplier(0.99, 0).unwrap(), 1.0);
    }

    #[test]
    fn multiplier_is_one_at_zero_rate() {
        assert_eq!(decay_multiplier(0.0, 10 * SECONDS_PER_YEAR).unwrap(), 1.0);
    }

    #[test]
    fn multiplier_one_year() {
        let m = decay_multiplier(0.02, SECONDS_PER_YEAR).unwrap();
        assert!((m - (-0.02f64).exp()).abs() < 1e-15, "multiplier {m}");
    }

    #[test]
    fn multiplier_never_reaches_zero() {
        let m = decay_multiplier(0.99, i64::MAX).unwrap();
        assert!(m > 0.0);
    }

    #[test]
    fn multiplier_rejects_negative_elapsed() {
        assert!(decay_multiplier(0.02, -1).is_err());
    }

    // --- compute_decayed_amount ---

    #[test]
    fn one_year_at_two_percent() {
        let input = DemurrageInput::new(1000.0, T0).with_rate(0.02);
        let decayed = compute_decayed_amount(&input, T0 + SECONDS_PER_YEAR).unwrap();
        assert!(
            (decayed - 980.198_673_306_755_3).abs() < 1e-9,
            "decayed after one year: {decayed}"
        );
    }

    #[test]
    fn zero_elapsed_returns_principal_exactly() {
        let input = DemurrageInput::new(1234.5678, T0).with_rate(0.5);
        assert_eq!(compute_decayed_amount(&input, T0).unwrap(), 1234.5678);
    }

    #[test]
    fn zero_principal_stays_zero() {
        let input = DemurrageInput::new(0.0, T0);
        assert_eq!(compute_decayed_amount(&input, T0 + 100 * DAY).unwrap(), 0.0);
    }

    #[test]
    fn decays_with_time() {
        let input = DemurrageInput::new(1000.0, T0);
        let d1 = compute_decayed_amount(&input, T0 + DAY).unwrap();
        let d30 = compute_decayed_amount(&input, T0 + 30 * DAY).unwrap();
        let d365 = compute_decayed_amount(&input, T0 + 365 * DAY).unwrap();
        assert!(d1 < 1000.0);
        assert!(d30 < d1, "decay should progress: {d30} < {d1}");
        assert!(d365 < d30, "decay should progress: {d365} < {d30}");
    }

    #[test]
    fn very_long_idle_stays_positive() {
        let input = DemurrageInput::new(1.0, 0).with_rate(0.99);
        let decayed = compute_decayed_amount(&input, i64::MAX).unwrap();
        assert!(decayed > 0.0);
        assert!(decayed <= 1.0);
    }

    #[test]
    fn rejects_rate_of_one() {
        let input = DemurrageInput::new(1000.0, T0).with_rate(1.0);
        assert!(matches!(
            compute_decayed_amount(&input, T0),
            Err(DecayError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_negative_principal() {
        let input = DemurrageInput::new(-1.0, T0);
        assert!(matches!(
            compute_decayed_amount(&input, T0),
            Err(DecayError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_now_before_last_activity() {
        let input = DemurrageInput::new(1000.0, T0);
        assert!(matches!(
            compute_decayed_amount(&input, T0 - 1),
            Err(DecayError::InvalidInput(_))
        ));
    }

    // --- engine ---

    #[test]
    fn breakdown_sums_to_principal() {
        let input = DemurrageInput::new(1000.0, T0);
        let b = engine().breakdown(&input, T0 + 90 * DAY).unwrap();
        assert_eq!(b.elapsed_secs, 90 * DAY);
        assert!((b.decayed_amount + b.decay_amount - b.principal).abs() < 1e-9);
        assert!((b.decayed_amount - 1000.0 * b.multiplier).abs() < 1e-9);
    }

    #[test]
    fn trait_compute_decay_matches_breakdown() {
        let e = engine();
        let input = DemurrageInput::new(500.0, T0);
        let now = T0 + 200 * DAY;
        let decay = e.compute_decay(&input, now).unwrap();
        let b = e.breakdown(&input, now).unwrap();
        assert!((decay - b.decay_amount).abs() < 1e-12);
    }

    #[test]
    fn configured_rate_is_used() {
        let slow = DemurrageEngine::new();
        let fast = DemurrageEngine::with_config(DecayConfig { annual_rate: 0.10 }).unwrap();
        let now = T0 + SECONDS_PER_YEAR;
        let a = slow.decayed_balance(1000.0, T0, now).unwrap();
        let b = fast.decayed_balance(1000.0, T0, now).unwrap();
        assert!(b < a, "higher rate decays more: {b} < {a}");
    }

    #[test]
    fn with_config_rejects_invalid_rate() {
        assert!(DemurrageEngine::with_config(DecayConfig { annual_rate: 1.5 }).is_err());
    }

    #[test]
    fn half_life_at_two_percent() {
        let secs = engine().half_life_secs().unwrap().unwrap();
        let years = secs / SECONDS_PER_YEAR as f64;
        assert!((years - 34.657_359).abs() < 1e-5, "half-life {years} years");
        let input = DemurrageInput::new(1000.0, 0);
        let halved = compute_decayed_amount(&input, secs.round() as i64).unwrap();
        assert!((halved - 500.0).abs() < 1e-3);
    }

    #[test]
    fn half_life_none_at_zero_rate() {
        assert_eq!(half_life_secs(0.0).unwrap(), None);
    }

    #[test]
    fn engine_is_object_safe() {
        let e = engine();
        let dyn_e: &dyn DecayCalculator = &e;
        let input = DemurrageInput::new(10.0, T0);
        assert_eq!(dyn_e.compute_decayed_amount(&input, T0).unwrap(), 10.0);
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn decayed_within_bounds(
            principal in 0.0f64..1e15,
            rate in 0.0f64..0.999,
            elapsed in 0i64..(1000 * SECONDS_PER_YEAR),
        ) {
            let input = DemurrageInput::new(principal, T0).with_rate(rate);
            let decayed = compute_decayed_amount(&input, T0 + elapsed).unwrap();
            prop_assert!(decayed >= 0.0);
            prop_assert!(decayed <= principal, "decayed {} > principal {}", decayed, principal);
        }

        #[test]
        fn zero_elapsed_is_identity(principal in 0.0f64..1e15, rate in 0.0f64..0.999) {
            let input = DemurrageInput::new(principal, T0).with_rate(rate);
            prop_assert_eq!(compute_decayed_amount(&input, T0).unwrap(), principal);
        }

        #[test]
        fn decay_monotonic_in_time(
            principal in 0.0f64..1e12,
            rate in 0.0f64..0.999,
            a in 0i64..(100 * SECONDS_PER_YEAR),
            b in 0i64..(100 * SECONDS_PER_YEAR),
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let input = DemurrageInput::new(principal, T0).with_rate(rate);
            let early = compute_decayed_amount(&input, T0 + lo).unwrap();
            let late = compute_decayed_amount(&input, T0 + hi).unwrap();
            prop_assert!(late <= early, "not monotonic: f({})={} < f({})={}", lo, early, hi, late);
        }

        #[test]
        fn positive_principal_never_vanishes(
            principal in 1e-6f64..1e12,
            rate in 0.0f64..0.999,
            elapsed in 0i64..i64::MAX / 2,
        ) {
            let input = DemurrageInput::new(principal, 0).with_rate(rate);
            prop_assert!(compute_decayed_amount(&input, elapsed).unwrap() > 0.0);
        }
    }
}
