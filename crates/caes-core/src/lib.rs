//! # caes-core
//! Foundation types and traits for the CAES demurrage and peg-band engine.

pub mod config;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
