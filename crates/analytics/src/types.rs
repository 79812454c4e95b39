// In crates/analytics/src/types.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A struct to hold a point in the portfolio's equity curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    /// Cash equity plus the open position marked at the bar's close.
    pub strategy_value: Decimal,
    /// Leveraged buy-and-hold value of the same starting equity.
    pub hodl_value: Decimal,
}

/// The realized effect of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PnlChange {
    /// Change of realized profit caused by the transition.
    pub change: Decimal,
    /// `change` relative to the notional involved, as a fraction.
    pub relative_profit: Decimal,
}

/// Counters accumulated over every realized transition of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RunStatistics {
    pub trade_count: u32,
    /// Running sum of per-transition relative profits (fractions).
    pub cumulative_relative_profit: Decimal,
    pub max_single_change: Decimal,
    pub min_single_change: Decimal,
}

/// The end-of-run figures of a simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SummaryReport {
    pub trade_count: u32,
    /// Realized profit in account currency, fees included.
    pub absolute_profit: Decimal,
    /// `absolute_profit / initial_equity * 100`, two decimals.
    pub relative_profit_pct: Decimal,
    /// Unrounded sum of per-transition relative profits.
    pub cumulative_relative_profit: Decimal,
    /// Unleveraged buy-and-hold return over the input series, in %.
    pub hodl_relative_profit_pct: Decimal,
    /// `relative_profit_pct / trade_count`, 0 without trades.
    pub average_relative_profit_pct: Decimal,
    pub max_single_change: Decimal,
    pub min_single_change: Decimal,
    pub final_cash_equity: Decimal,
    pub final_strategy_value: Decimal,
    pub max_drawdown_absolute: Decimal,
    pub max_drawdown_percentage: Decimal,
    pub hodl_max_drawdown_percentage: Decimal,
    pub bars_processed: usize,
    /// True when the run stopped because the portfolio was exhausted.
    pub halted_early: bool,
}

impl SummaryReport {
    /// Creates a new, empty report with zero values.
    pub fn new() -> Self {
        Self::default()
    }
}
