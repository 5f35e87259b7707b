//! Scenario and property test suite for the CAES engine.
//!
//! Integration tests live in `tests/`; this crate only exposes the shared
//! helpers they use.

pub mod helpers;
