//! Economic constants. Rates are fractions (0.02 = 2%), times are Unix seconds.

/// Seconds in a non-leap year. The demurrage exponent is normalised by this.
pub const SECONDS_PER_YEAR: i64 = 365 * 24 * 3600;

/// Default annual demurrage rate (2%).
pub const DEFAULT_ANNUAL_RATE: f64 = 0.02;

/// Default half-width of the gold-peg tolerance band (±5%).
pub const DEFAULT_TOLERANCE_FRACTION: f64 = 0.05;

/// Default proportionality between normalised distance above the band and the penalty rate.
pub const DEFAULT_PENALTY_COEFFICIENT: f64 = 1.0;

/// Default proportionality between normalised distance below the band and the reward rate.
pub const DEFAULT_REWARD_COEFFICIENT: f64 = 1.0;

/// Default interval between price polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default timeout for a single price fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// Consecutive feed failures after which a published snapshot is marked stale.
pub const DEFAULT_STALE_AFTER_FAILURES: u32 = 3;

// --- Stabilization policy ---

/// Absolute deviation above which emergency throttling applies.
pub const EMERGENCY_DEVIATION: f64 = 0.18;
/// Width of the emergency ramp; the emergency factor reaches 1.0 at `EMERGENCY_DEVIATION + EMERGENCY_RAMP`.
pub const EMERGENCY_RAMP: f64 = 0.02;
/// Throttle rate at an emergency factor of 1.0.
pub const EMERGENCY_THROTTLE_RATE: f64 = 0.02;

/// Absolute deviation above which moderate throttling applies.
pub const MODERATE_DEVIATION: f64 = 0.10;
/// Baseline subtracted from the deviation before scaling moderate throttling.
pub const MODERATE_BASELINE: f64 = 0.05;
/// Throttle rate per unit of moderate factor.
pub const MODERATE_THROTTLE_RATE: f64 = 0.005;

/// Absolute deviation below which the market is treated as too stable.
pub const STAGNANT_DEVIATION: f64 = 0.03;
/// Fee discount applied to a stagnant market.
pub const STAGNANT_DISCOUNT: f64 = 0.0005;

/// Slope of the adjustment inside the normal deviation range.
pub const NORMAL_ADJUSTMENT_SLOPE: f64 = 0.001;

/// Maximum absolute stabilization adjustment as a fraction of the amount (±2%).
pub const MAX_STABILIZATION_ADJUSTMENT: f64 = 0.02;

// --- Market indicator adjustments ---

/// Transaction volume above which transfers are throttled.
pub const HIGH_VOLUME_THRESHOLD: f64 = 1_000_000.0;
/// Volume subtracted before scaling the high-volume throttle.
pub const VOLUME_THROTTLE_BASELINE: f64 = 500_000.0;
/// Volume per unit of throttle factor.
pub const VOLUME_THROTTLE_UNIT: f64 = 1_000_000.0;
/// Throttle rate per unit of volume factor.
pub const VOLUME_THROTTLE_RATE: f64 = 0.003;
/// Transaction volume below which activity is encouraged.
pub const LOW_VOLUME_THRESHOLD: f64 = 100_000.0;
/// Fee discount for a low-volume market.
pub const LOW_VOLUME_DISCOUNT: f64 = 0.001;

/// Volatility above which a surcharge proportional to volatility applies.
pub const HIGH_VOLATILITY: f64 = 0.3;
/// Surcharge rate per unit of volatility.
pub const VOLATILITY_SURCHARGE_RATE: f64 = 0.005;
/// Volatility below which a small discount applies.
pub const LOW_VOLATILITY: f64 = 0.1;
/// Fee discount for a calm market.
pub const LOW_VOLATILITY_DISCOUNT: f64 = 0.001;

/// Liquidity depth below which a stress premium applies.
pub const LOW_LIQUIDITY_DEPTH: f64 = 100_000.0;
/// Premium at zero liquidity (1%).
pub const LIQUIDITY_STRESS_RATE: f64 = 0.01;
/// Liquidity depth above which a small discount applies.
pub const HIGH_LIQUIDITY_DEPTH: f64 = 1_000_000.0;
/// Fee discount for a deep market.
pub const HIGH_LIQUIDITY_DISCOUNT: f64 = 0.0005;

// --- Health score ---

pub const HEALTH_WEIGHT_GOLD: f64 = 0.4;
pub const HEALTH_WEIGHT_VOLATILITY: f64 = 0.3;
pub const HEALTH_WEIGHT_VOLUME: f64 = 0.2;
pub const HEALTH_WEIGHT_LIQUIDITY: f64 = 0.1;

/// Transaction volume corresponding to one health point.
pub const HEALTH_VOLUME_UNIT: f64 = 1_000_000.0;
/// Liquidity depth corresponding to one health point.
pub const HEALTH_LIQUIDITY_UNIT: f64 = 100_000.0;
/// Upper bound of every health component and of the overall health score.
pub const HEALTH_MAX: f64 = 10.0;
