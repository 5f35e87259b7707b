//! # caes-monitor: Peg-band polling for presentation layers.
//!
//! The core math is pure; this crate is the glue that feeds it. A
//! [`BandMonitor`] polls an injected [`PriceSource`] on a fixed interval,
//! classifies each quote and publishes the latest [`MonitorSnapshot`] on a
//! `tokio::sync::watch` channel. Feed failures never surface as errors: they
//! leave the previous snapshot in place and eventually mark it stale.
//!
//! [`PriceSource`]: caes_core::traits::PriceSource

pub mod config;
pub mod monitor;
pub mod source;

pub use config::MonitorConfig;
pub use monitor::{BandMonitor, BandReading, MonitorHandle, MonitorSnapshot};
pub use source::{ScriptedPriceSource, StaticPriceSource};
