//! In-process [`PriceSource`] implementations.
//!
//! Real oracle adapters live outside this workspace; these sources serve
//! tests, demos and the CLI.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use caes_core::error::PriceFeedError;
use caes_core::traits::PriceSource;
use caes_core::types::PriceQuote;

/// Always returns the same quote.
#[derive(Debug, Clone)]
pub struct StaticPriceSource {
    quote: PriceQuote,
}

impl StaticPriceSource {
    pub fn new(reference_price: f64, current_price: f64, observed_at: i64) -> Self {
        Self {
            quote: PriceQuote {
                current_price,
                reference_price,
                observed_at,
            },
        }
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn fetch(&self) -> Result<PriceQuote, PriceFeedError> {
        Ok(self.quote)
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Replays a fixed sequence of fetch outcomes, one per call.
///
/// Once the script runs out every fetch fails with
/// [`PriceFeedError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedPriceSource {
    script: Mutex<VecDeque<Result<PriceQuote, PriceFeedError>>>,
}

impl ScriptedPriceSource {
    pub fn new(script: impl IntoIterator<Item = Result<PriceQuote, PriceFeedError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    /// Number of outcomes not yet served.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    async fn fetch(&self) -> Result<PriceQuote, PriceFeedError> {
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(PriceFeedError::Unavailable("script exhausted".into())))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
