// In app/src/main.rs

use anyhow::{Context, Result};
use app_config::Settings;
use backtester::{print_report, Backtester};
use clap::{Parser, Subcommand};
use core_types::Symbol;
use market_data::{parse_timestamp, CsvStore};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use strategies::{slice_window, EwmaCrossover, Strategy};
use tracing_subscriber::prelude::*;

mod export;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Backtests an EWMA crossover strategy on historical candles.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs a historical backtest. Flags override the configuration files.
    Backtest(BacktestArgs),
}

#[derive(clap::Args, Debug, Default)]
struct BacktestArgs {
    /// Candle CSV file.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Market label (e.g., "BTC-PERP").
    #[arg(short, long)]
    market: Option<String>,

    /// First bar to simulate, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    from: Option<String>,

    /// Last bar to simulate, RFC 3339 or YYYY-MM-DD.
    #[arg(long)]
    to: Option<String>,

    /// Fee rate as a decimal (0.07% = 0.0007).
    #[arg(long)]
    fee: Option<Decimal>,

    #[arg(long)]
    leverage: Option<Decimal>,

    /// Starting equity.
    #[arg(long)]
    equity: Option<Decimal>,

    /// Slow EWMA span in bars.
    #[arg(long)]
    slow: Option<usize>,

    /// Fast EWMA span in bars.
    #[arg(long)]
    fast: Option<usize>,

    /// Directory for the exported artifacts.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the report without writing any files.
    #[arg(long)]
    no_export: bool,
}

impl BacktestArgs {
    /// Folds the command-line overrides into the loaded settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.data {
            settings.data.path = path.clone();
        }
        if let Some(market) = &self.market {
            settings.data.market = market.clone();
        }
        if let Some(from) = &self.from {
            settings.data.from = Some(from.clone());
        }
        if let Some(to) = &self.to {
            settings.data.to = Some(to.clone());
        }
        if let Some(fee) = self.fee {
            settings.simulation.fee_rate = fee;
        }
        if let Some(leverage) = self.leverage {
            settings.simulation.leverage = leverage;
        }
        if let Some(equity) = self.equity {
            settings.simulation.initial_equity = equity;
        }
        if let Some(slow) = self.slow {
            settings.strategy.slow_window = slow;
        }
        if let Some(fast) = self.fast {
            settings.strategy.fast_window = fast;
        }
        if let Some(dir) = &self.output_dir {
            settings.output.dir = dir.clone();
        }
    }
}

// --- Main Application Entry Point ---

fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let mut settings = app_config::load_settings().context("failed to load configuration")?;
    init_tracing(&settings.app.log_level);

    tracing::info!(environment = %settings.app.environment, "Starting backtester application");

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Backtest(args) => {
            args.apply(&mut settings);
            handle_backtest(&settings, !args.no_export)?;
        }
    }

    tracing::info!("Backtester application has finished successfully.");

    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = tracing::Level::from_str(log_level).unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();
}

/// Handles the logic for the `backtest` subcommand.
fn handle_backtest(settings: &Settings, export: bool) -> Result<()> {
    // --- 1. Load Data ---
    let store = CsvStore::new(&settings.data.path, Symbol(settings.data.market.clone()));
    let candles = store
        .load_candles()
        .with_context(|| format!("failed to load candles from {}", store.path().display()))?;

    let from = settings.data.from.as_deref().map(parse_timestamp).transpose()?;
    let to = settings.data.to.as_deref().map(parse_timestamp).transpose()?;

    // --- 2. Annotate, then cut out the simulated range ---
    let mut strategy = EwmaCrossover::new(settings.strategy.clone())?;
    let bars = slice_window(strategy.annotate(&candles)?, from, to);
    tracing::info!(
        market = %store.market().0,
        strategy = strategy.name(),
        candles = candles.len(),
        bars = bars.len(),
        ?from,
        ?to,
        "Prepared bars for simulation."
    );

    // --- 3. Setup and Run the Backtester ---
    let backtester = Backtester::from_settings(settings.simulation.clone(), settings.stop_loss.clone())?;
    let outcome = backtester.run(&bars).context("backtest failed")?;

    print_report(&outcome.summary);

    // --- 4. Hand the results to the plotting side ---
    if export {
        let manifest = export::RunManifest {
            market: &settings.data.market,
            strategy: &settings.strategy,
            simulation: &settings.simulation,
            summary: &outcome.summary,
            final_state: &outcome.final_state,
        };
        export::save_artifacts(&outcome, &manifest, &settings.output.dir)?;
        tracing::info!(dir = %settings.output.dir.display(), "Artifacts saved.");
    }

    Ok(())
}
