use crate::types::{EquityPoint, RunStatistics, SummaryReport};
use core_types::Portfolio;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The engine responsible for turning run state into a summary report.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the end-of-run report.
    ///
    /// `first_close` and `last_close` span the whole input series, so the
    /// hodl return is measured over the full requested range even when the
    /// simulation stopped early.
    pub fn summarize(
        &self,
        portfolio: &Portfolio,
        stats: &RunStatistics,
        equity_curve: &[EquityPoint],
        first_close: Decimal,
        last_close: Decimal,
        halted_early: bool,
    ) -> SummaryReport {
        let mut report = SummaryReport::new();

        // --- Realized figures ---
        report.trade_count = stats.trade_count;
        report.absolute_profit = portfolio.realized_profit;
        if portfolio.initial_equity > dec!(0) {
            report.relative_profit_pct =
                (portfolio.realized_profit / portfolio.initial_equity * dec!(100)).round_dp(2);
        }
        report.cumulative_relative_profit = stats.cumulative_relative_profit;
        report.average_relative_profit_pct = if stats.trade_count > 0 {
            (report.relative_profit_pct / Decimal::from(stats.trade_count)).round_dp(2)
        } else {
            dec!(0)
        };
        report.max_single_change = stats.max_single_change;
        report.min_single_change = stats.min_single_change;
        report.final_cash_equity = portfolio.cash_equity;

        // --- Baseline ---
        if first_close > dec!(0) {
            report.hodl_relative_profit_pct =
                ((last_close / first_close - dec!(1)) * dec!(100)).round_dp(2);
        }

        // --- Equity curve ---
        report.bars_processed = equity_curve.len();
        report.final_strategy_value = equity_curve
            .last()
            .map(|p| p.strategy_value)
            .unwrap_or(portfolio.cash_equity);

        let (dd_abs, dd_pct) = max_drawdown(
            portfolio.initial_equity,
            equity_curve.iter().map(|p| p.strategy_value),
        );
        report.max_drawdown_absolute = dd_abs;
        report.max_drawdown_percentage = dd_pct;
        let (_, hodl_dd_pct) = max_drawdown(
            portfolio.initial_equity,
            equity_curve.iter().map(|p| p.hodl_value),
        );
        report.hodl_max_drawdown_percentage = hodl_dd_pct;

        report.halted_early = halted_early;
        report
    }
}

/// Largest peak-to-trough fall, absolute and as % of the peak it fell from.
fn max_drawdown(initial: Decimal, values: impl Iterator<Item = Decimal>) -> (Decimal, Decimal) {
    let mut peak = initial;
    let mut max_abs = dec!(0);
    let mut max_pct = dec!(0);
    for value in values {
        peak = peak.max(value);
        let drawdown = peak - value;
        max_abs = max_abs.max(drawdown);
        if peak > dec!(0) {
            max_pct = max_pct.max(drawdown / peak * dec!(100));
        }
    }
    (max_abs, max_pct.round_dp(2))
}
