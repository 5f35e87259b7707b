//! Background peg-band monitor.
//!
//! [`BandMonitor::spawn`] starts a tokio task that ticks every
//! `poll_interval`, fetches a quote (bounded by `fetch_timeout`), classifies
//! it and publishes a [`MonitorSnapshot`]. Commands reach the task over an
//! unbounded mpsc channel; snapshots leave it over a `watch` channel so
//! subscribers only ever see the latest state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use caes_core::error::{CaesError, PriceFeedError};
use caes_core::traits::{BandClassifier, PriceSource};
use caes_core::types::{DeviationBandResult, PriceQuote};

use crate::config::MonitorConfig;

/// A quote together with its classification.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BandReading {
    pub quote: PriceQuote,
    pub result: DeviationBandResult,
}

/// What a presentation layer should currently display.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MonitorSnapshot {
    /// No successful poll yet.
    Loading,
    Ready(BandReading),
    /// The feed has failed repeatedly; `last` is the most recent good reading.
    Stale {
        last: BandReading,
        consecutive_failures: u32,
    },
}

impl MonitorSnapshot {
    /// Display string: the band label when ready, otherwise the feed state.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Ready(reading) => reading.result.status.label(),
            Self::Stale { .. } => "Stale",
        }
    }

    /// Most recent reading, fresh or stale.
    pub fn reading(&self) -> Option<&BandReading> {
        match self {
            Self::Loading => None,
            Self::Ready(reading) => Some(reading),
            Self::Stale { last, .. } => Some(last),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Feed bookkeeping between ticks.
#[derive(Debug, Default)]
struct PollState {
    last_good: Option<BandReading>,
    consecutive_failures: u32,
}

impl PollState {
    fn record_success(&mut self, reading: BandReading) -> MonitorSnapshot {
        self.last_good = Some(reading);
        self.consecutive_failures = 0;
        MonitorSnapshot::Ready(reading)
    }

    /// Returns a snapshot to publish, or `None` to keep the current one.
    fn record_failure(&mut self, stale_after: u32) -> Option<MonitorSnapshot> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        match self.last_good {
            Some(last) if self.consecutive_failures >= stale_after => Some(MonitorSnapshot::Stale {
                last,
                consecutive_failures: self.consecutive_failures,
            }),
            _ => None,
        }
    }
}

enum Command {
    Shutdown,
}

struct SharedState {
    running: AtomicBool,
    polls: AtomicU64,
}

/// Polls a [`PriceSource`] and classifies each quote.
pub struct BandMonitor {
    source: Arc<dyn PriceSource>,
    classifier: Arc<dyn BandClassifier>,
    config: MonitorConfig,
}

impl std::fmt::Debug for BandMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BandMonitor")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .finish()
    }
}

impl BandMonitor {
    pub fn new(
        source: Arc<dyn PriceSource>,
        classifier: Arc<dyn BandClassifier>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Fetch and classify a single quote.
    ///
    /// A fetch exceeding `fetch_timeout` fails with [`PriceFeedError::Timeout`];
    /// a quote outside the classifier's domain fails with the classifier's error.
    pub async fn poll_once(&self) -> Result<BandReading, CaesError> {
        let quote = time::timeout(self.config.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| PriceFeedError::Timeout)??;
        let result = self
            .classifier
            .classify(&quote.band_input(self.config.tolerance_fraction))?;
        Ok(BandReading { quote, result })
    }

    /// Start the polling task. The first poll happens immediately.
    pub fn spawn(self) -> MonitorHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(MonitorSnapshot::Loading);
        let state = Arc::new(SharedState {
            running: AtomicBool::new(true),
            polls: AtomicU64::new(0),
        });

        info!(
            source = self.source.name(),
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "starting band monitor"
        );

        let state_clone = Arc::clone(&state);
        let task = tokio::spawn(async move {
            poll_loop(self, command_rx, snapshot_tx, state_clone).await;
        });

        MonitorHandle {
            command_tx,
            snapshot_rx,
            state,
            task,
        }
    }
}

async fn poll_loop(
    monitor: BandMonitor,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: watch::Sender<MonitorSnapshot>,
    state: Arc<SharedState>,
) {
    let mut ticker = time::interval(monitor.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut poll_state = PollState::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                state.polls.fetch_add(1, Ordering::Relaxed);
                let next = match monitor.poll_once().await {
                    Ok(reading) => {
                        debug!(
                            current = reading.quote.current_price,
                            reference = reading.quote.reference_price,
                            status = %reading.result.status,
                            "band reading"
                        );
                        Some(poll_state.record_success(reading))
                    }
                    Err(e) => {
                        let next = poll_state.record_failure(monitor.config.stale_after_failures);
                        warn!(
                            source = monitor.source.name(),
                            failures = poll_state.consecutive_failures,
                            "price poll failed: {e}"
                        );
                        next
                    }
                };
                if let Some(snapshot) = next {
                    if snapshot.is_stale() {
                        warn!("band reading is stale");
                    }
                    snapshot_tx.send_replace(snapshot);
                }
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(Command::Shutdown) | None => {
                        info!("shutting down band monitor");
                        break;
                    }
                }
            }
        }
    }

    state.running.store(false, Ordering::Relaxed);
}

/// Handle to a running [`BandMonitor`] task.
pub struct MonitorHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<MonitorSnapshot>,
    state: Arc<SharedState>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("running", &self.is_running())
            .field("polls", &self.polls())
            .finish()
    }
}

impl MonitorHandle {
    /// A receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn latest(&self) -> MonitorSnapshot {
        *self.snapshot_rx.borrow()
    }

    /// Whether the polling task is still running.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Relaxed)
    }

    /// Number of polls attempted so far.
    pub fn polls(&self) -> u64 {
        self.state.polls.load(Ordering::Relaxed)
    }

    /// Ask the polling task to stop after its current tick.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }

    /// Wait for the polling task to exit.
    pub async fn join(&mut self) {
        if let Err(e) = (&mut self.task).await {
            warn!("band monitor task failed: {e}");
        }
    }
}
