//! caes-cli: command-line front end for the CAES economic engine.
//!
//! Evaluates demurrage, peg-band classification and stabilization from the
//! command line, and can watch a fixed price feed through the band monitor.

mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use caes_core::config::CaesConfig;
use caes_core::traits::{BandClassifier, DecayCalculator};
use caes_core::types::{DemurrageInput, DeviationBandInput, Incentive, MarketIndicators};
use caes_decay::stabilization::{adjustment_for_band, market_adjustment};
use caes_decay::{health_score, DemurrageEngine, PegBandClassifier, StabilityGrade};
use caes_monitor::{BandMonitor, MonitorConfig, StaticPriceSource};

/// CAES command-line interface.
#[derive(Parser)]
#[command(name = "caes-cli")]
#[command(version, about = "Demurrage and gold-peg band calculator for CAES")]
struct Cli {
    /// Config file (default: ~/.config/caes/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json").
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decay a balance from its last activity until now.
    Decay(DecayArgs),
    /// Classify a price against its gold-peg band.
    Band(BandArgs),
    /// Fee adjustment for a transfer at the current peg deviation.
    Stabilize(StabilizeArgs),
    /// Market health score and grade.
    Health(HealthArgs),
    /// Poll a fixed quote through the band monitor.
    Watch(WatchArgs),
}

#[derive(Args)]
struct DecayArgs {
    /// Balance before decay.
    #[arg(short, long)]
    principal: f64,

    /// Unix timestamp of the last activity.
    #[arg(short, long)]
    last_activity: i64,

    /// Evaluation time as a Unix timestamp (default: now).
    #[arg(short, long)]
    now: Option<i64>,

    /// Annual decay rate (default: from config).
    #[arg(short, long)]
    rate: Option<f64>,
}

#[derive(Args)]
struct BandArgs {
    /// Gold-pegged reference price.
    #[arg(short, long)]
    reference: f64,

    /// Observed token price.
    #[arg(short, long)]
    current: f64,

    /// Band half-width as a fraction (default: from config).
    #[arg(short, long)]
    tolerance: Option<f64>,
}

#[derive(Args)]
struct StabilizeArgs {
    /// Transfer amount.
    #[arg(short, long)]
    amount: f64,

    /// Gold-pegged reference price.
    #[arg(short, long)]
    reference: f64,

    /// Observed token price.
    #[arg(short, long)]
    current: f64,

    /// Market volatility index in [0, 1]; enables market-aware adjustment.
    #[arg(long, requires_all = ["volume", "liquidity"])]
    volatility: Option<f64>,

    /// Recent transaction volume.
    #[arg(long, requires_all = ["volatility", "liquidity"])]
    volume: Option<f64>,

    /// Market liquidity depth.
    #[arg(long, requires_all = ["volatility", "volume"])]
    liquidity: Option<f64>,
}

impl StabilizeArgs {
    /// Market indicators, when all three market flags are given.
    fn indicators(&self) -> Option<MarketIndicators> {
        Some(MarketIndicators {
            current_gold_price: self.current,
            target_gold_price: self.reference,
            market_volatility: self.volatility?,
            transaction_volume: self.volume?,
            liquidity_depth: self.liquidity?,
        })
    }
}

#[derive(Args)]
struct HealthArgs {
    /// Current gold price.
    #[arg(long)]
    gold_price: f64,

    /// Target gold price.
    #[arg(long)]
    target_gold: f64,

    /// Market volatility index in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    volatility: f64,

    /// Recent transaction volume.
    #[arg(long, default_value_t = 0.0)]
    volume: f64,

    /// Market liquidity depth.
    #[arg(long, default_value_t = 0.0)]
    liquidity: f64,
}

#[derive(Args)]
struct WatchArgs {
    /// Gold-pegged reference price.
    #[arg(short, long)]
    reference: f64,

    /// Observed token price.
    #[arg(short, long)]
    current: f64,

    /// Number of snapshots to print before exiting.
    #[arg(long, default_value_t = 3)]
    ticks: u32,

    /// Poll interval in seconds (default: from config).
    #[arg(long)]
    interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let cfg = settings::load(cli.config.as_deref())?;
    debug!(?cfg, "configuration loaded");

    match cli.command {
        Commands::Decay(args) => decay(&cfg, args, cli.json),
        Commands::Band(args) => band(&cfg, args, cli.json),
        Commands::Stabilize(args) => stabilize(&cfg, args, cli.json),
        Commands::Health(args) => health(args, cli.json),
        Commands::Watch(args) => watch(&cfg, args, cli.json).await,
    }
}

fn decay(cfg: &CaesConfig, args: DecayArgs, json: bool) -> Result<()> {
    let engine = DemurrageEngine::with_config(cfg.decay)?;
    let now = args.now.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let rate = args.rate.unwrap_or(engine.config().annual_rate);
    let input = DemurrageInput::new(args.principal, args.last_activity).with_rate(rate);

    let breakdown = engine
        .breakdown(&input, now)
        .context("cannot compute demurrage")?;

    if json {
        return print_json(&breakdown);
    }

    println!("Principal:  {:.8}", breakdown.principal);
    println!("Decayed:    {:.8}", breakdown.decayed_amount);
    println!(
        "Decay:     -{:.8} ({:.4}%)",
        breakdown.decay_amount,
        (1.0 - breakdown.multiplier) * 100.0
    );
    println!("Elapsed:    {} days", breakdown.elapsed_secs / 86_400);
    println!("Rate:       {:.2}% per year", rate * 100.0);
    if let Some(half_life) = caes_decay::half_life_secs(rate)? {
        println!("Half-life:  {:.1} years", half_life / caes_core::constants::SECONDS_PER_YEAR as f64);
    }
    Ok(())
}

fn band(cfg: &CaesConfig, args: BandArgs, json: bool) -> Result<()> {
    let classifier = PegBandClassifier::with_config(cfg.band)?;
    let tolerance = args.tolerance.unwrap_or(cfg.band.tolerance_fraction);
    let input = DeviationBandInput::new(args.reference, args.current, tolerance);

    let result = classifier
        .classify(&input)
        .context("cannot classify price")?;

    if json {
        #[derive(Serialize)]
        struct BandOutput {
            #[serde(flatten)]
            result: caes_core::types::DeviationBandResult,
            label: &'static str,
            incentive: Incentive,
        }
        return print_json(&BandOutput {
            result,
            label: result.status.label(),
            incentive: result.incentive(),
        });
    }

    println!("Band:       {:.4} .. {:.4}", result.lower_bound, result.upper_bound);
    println!("Deviation:  {:+.2}%", result.deviation_percentage);
    println!("Status:     {}", result.status);
    match result.incentive() {
        Incentive::Penalty(rate) => println!("Penalty:    {:.4}%", rate * 100.0),
        Incentive::Reward(rate) => println!("Reward:     {:.4}%", rate * 100.0),
        Incentive::None => println!("Incentive:  none"),
    }
    Ok(())
}

fn stabilize(cfg: &CaesConfig, args: StabilizeArgs, json: bool) -> Result<()> {
    let classifier = PegBandClassifier::with_config(cfg.band)?;
    let result = classifier
        .classify_price(args.reference, args.current)
        .context("cannot classify price")?;
    let adjustment = match args.indicators() {
        Some(indicators) => market_adjustment(args.amount, &indicators),
        None => adjustment_for_band(args.amount, &result),
    }
    .context("cannot compute adjustment")?;

    if json {
        return print_json(&serde_json::json!({
            "amount": args.amount,
            "deviation_percentage": result.deviation_percentage,
            "status": result.status,
            "adjustment": adjustment,
        }));
    }

    println!("Deviation:  {:+.2}% ({})", result.deviation_percentage, result.status);
    println!("Adjustment: {:+.8}", adjustment);
    Ok(())
}

fn health(args: HealthArgs, json: bool) -> Result<()> {
    let indicators = MarketIndicators {
        current_gold_price: args.gold_price,
        target_gold_price: args.target_gold,
        market_volatility: args.volatility,
        transaction_volume: args.volume,
        liquidity_depth: args.liquidity,
    };
    let score = health_score(&indicators).context("cannot score market")?;
    let grade = StabilityGrade::from_health(score);

    if json {
        return print_json(&serde_json::json!({
            "score": score,
            "grade": grade,
            "recommended_fee_adjustment": grade.recommended_fee_adjustment(),
        }));
    }

    println!("Health:     {:.2} / 10", score);
    println!("Grade:      {}", grade);
    println!("Fee adj.:   {:+.2}%", grade.recommended_fee_adjustment() * 100.0);
    Ok(())
}

async fn watch(cfg: &CaesConfig, args: WatchArgs, json: bool) -> Result<()> {
    if args.ticks == 0 {
        bail!("--ticks must be at least 1");
    }

    let mut monitor_cfg = MonitorConfig::from_settings(&cfg.monitor, &cfg.band);
    if let Some(secs) = args.interval_secs {
        if secs == 0 {
            bail!("--interval-secs must be at least 1");
        }
        monitor_cfg.poll_interval = Duration::from_secs(secs);
    }

    let source = StaticPriceSource::new(args.reference, args.current, chrono::Utc::now().timestamp());
    let classifier = PegBandClassifier::with_config(cfg.band)?;
    let mut handle = BandMonitor::new(Arc::new(source), Arc::new(classifier), monitor_cfg).spawn();
    let mut rx = handle.subscribe();

    for tick in 1..=args.ticks {
        rx.changed().await.context("band monitor stopped")?;
        let snapshot = *rx.borrow_and_update();
        if json {
            print_json(&snapshot)?;
            continue;
        }
        match snapshot.reading() {
            Some(reading) => println!(
                "[{tick}] {} current={:.4} reference={:.4} deviation={:+.2}%",
                snapshot.label(),
                reading.quote.current_price,
                reading.quote.reference_price,
                reading.result.deviation_percentage,
            ),
            None => println!("[{tick}] {}", snapshot.label()),
        }
    }

    handle.shutdown();
    handle.join().await;
    info!("watch finished");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level_str`. Pass `format = "json"` for
/// structured output; any other value gives human-readable text on stderr.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
