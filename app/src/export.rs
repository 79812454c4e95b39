//! Artifact export for the plotting side.
//!
//! A run directory holds:
//! - `equity.csv`: timestamp, strategy and hodl value per processed bar
//! - `markers.csv`: one buy/sell/exit marker per realized transition
//! - `summary.json`: the run parameters next to the summary report

use std::path::Path;

use anyhow::{Context, Result};
use analytics::{EquityPoint, SummaryReport};
use backtester::{BacktestSettings, SimulationOutcome};
use core_types::{Marker, MarkerKind, PositionState};
use serde::Serialize;
use strategies::EwmaCrossSettings;

/// What produced a run, stored next to its results.
#[derive(Debug, Serialize)]
pub struct RunManifest<'a> {
    pub market: &'a str,
    pub strategy: &'a EwmaCrossSettings,
    pub simulation: &'a BacktestSettings,
    pub summary: &'a SummaryReport,
    pub final_state: &'a PositionState,
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export an equity curve as CSV.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "strategy", "hodl"])?;
    for point in equity_curve {
        wtr.write_record([
            &point.timestamp.to_rfc3339(),
            &point.strategy_value.round_dp(6).to_string(),
            &point.hodl_value.round_dp(6).to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export chart markers as CSV.
pub fn export_markers_csv(markers: &[Marker]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "kind", "price"])?;
    for marker in markers {
        let kind = match marker.kind {
            MarkerKind::Buy => "buy",
            MarkerKind::Sell => "sell",
            MarkerKind::Exit => "exit",
        };
        wtr.write_record([marker.timestamp.to_rfc3339().as_str(), kind, marker.price.to_string().as_str()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single run into `output_dir`,
/// overwriting the files of any previous run there.
pub fn save_artifacts(outcome: &SimulationOutcome, manifest: &RunManifest<'_>, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    let equity_csv = export_equity_csv(&outcome.equity_curve)?;
    std::fs::write(output_dir.join("equity.csv"), equity_csv).context("failed to write equity.csv")?;

    let markers_csv = export_markers_csv(&outcome.markers)?;
    std::fs::write(output_dir.join("markers.csv"), markers_csv).context("failed to write markers.csv")?;

    let json = serde_json::to_string_pretty(manifest).context("failed to serialize run summary to JSON")?;
    std::fs::write(output_dir.join("summary.json"), json).context("failed to write summary.json")?;

    Ok(())
}
