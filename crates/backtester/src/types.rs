// In crates/backtester/src/types.rs

use analytics::{EquityPoint, RunStatistics, SummaryReport};
use chrono::{DateTime, Utc};
use core_types::{Marker, PositionState, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Parameters of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Fee on the notional of every fee-paying fill, in [0, 1).
    pub fee_rate: Decimal,
    /// Position size multiplier, must be positive. 1 means no leverage.
    pub leverage: Decimal,
    /// Starting cash equity.
    pub initial_equity: Decimal,
    /// Vertical offset of buy/sell markers from the close.
    pub plot_distance: Decimal,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.0006),
            leverage: dec!(1),
            initial_equity: dec!(1000),
            plot_distance: dec!(0.1),
        }
    }
}

/// What a realized transition did to the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Entry,
    Exit,
    /// Fee-free exit triggered by the short stop level.
    StopExit,
    PartialExit,
}

/// One realized change of the position, as booked by the accumulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub timestamp: DateTime<Utc>,
    pub kind: TransitionKind,
    pub side: Side,
    pub price: Decimal,
    /// Units opened or closed.
    pub amount: Decimal,
    pub fee: Decimal,
    pub change: Decimal,
    pub relative_profit: Decimal,
    /// Cash equity after the change was folded in.
    pub cash_equity: Decimal,
}

impl Transition {
    /// Short tag used in logs.
    pub fn tag(&self) -> &'static str {
        match (self.kind, self.side) {
            (TransitionKind::Entry, Side::Long) => "buy",
            (TransitionKind::Entry, Side::Short) => "sell",
            (TransitionKind::Exit, Side::Long) => "long_exit",
            (TransitionKind::Exit, Side::Short) => "short_exit",
            (TransitionKind::StopExit, _) => "short_stop",
            (TransitionKind::PartialExit, _) => "partial_exit",
        }
    }
}

/// Everything a run produces, handed to reporting and plotting.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub summary: SummaryReport,
    pub stats: RunStatistics,
    pub final_state: PositionState,
    pub transitions: Vec<Transition>,
    pub markers: Vec<Marker>,
    pub equity_curve: Vec<EquityPoint>,
}
