//! # caes-decay: Demurrage and peg-band engine.
//!
//! All functions are pure and safe to call from any number of threads.
//!
//! - **Demurrage**: an idle balance decays continuously,
//!   `principal * exp(-rate * elapsed / year)`, so it never goes negative and
//!   never reaches zero in finite time.
//! - **Deviation bands**: the token price is compared with a gold-pegged
//!   reference. Above the band a penalty applies, below it a reward, and the
//!   magnitude grows linearly with the distance outside the band.
//! - **Stabilization**: tiered fee adjustments and a health score derived
//!   from the gold-price deviation and market indicators.

pub mod band;
pub mod engine;
pub mod stabilization;

pub use band::{classify, PegBandClassifier};
pub use engine::{compute_decayed_amount, decay_multiplier, half_life_secs, DemurrageEngine};
pub use stabilization::{health_score, market_adjustment, stabilization_adjustment, StabilityGrade};
