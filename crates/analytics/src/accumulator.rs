// In crates/analytics/src/accumulator.rs

use crate::types::{PnlChange, RunStatistics};
use crate::{Error, Result};
use core_types::{Portfolio, Side};
use rust_decimal::Decimal;

/// Folds every realized transition into the portfolio and the run counters.
#[derive(Debug, Default)]
pub struct PnlAccumulator {
    stats: RunStatistics,
}

impl PnlAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Records one transition whose fill moved `realized_profit` away from
    /// `prior_profit`.
    ///
    /// `label` is the side of the transition being booked, not the state the
    /// position ends up in. For shorts the sign of the ratio is flipped so a
    /// profitable short reports a positive relative profit against its
    /// negative reference. `value` is the signed entry reference and `amount`
    /// the units involved in this fill.
    pub fn record(
        &mut self,
        portfolio: &mut Portfolio,
        label: Side,
        value: Decimal,
        amount: Decimal,
        prior_profit: Decimal,
    ) -> Result<PnlChange> {
        let denominator = amount * value;
        if denominator.is_zero() {
            return Err(Error::ZeroPositionValue { amount, value });
        }

        let change = portfolio.realized_profit - prior_profit;
        portfolio.cash_equity += change;

        let relative_profit = match label {
            Side::Short => -change / denominator,
            Side::Long => change / denominator,
        };

        self.stats.cumulative_relative_profit += relative_profit;
        if change > self.stats.max_single_change {
            self.stats.max_single_change = change;
        } else if change < self.stats.min_single_change {
            self.stats.min_single_change = change;
        }
        self.stats.trade_count += 1;

        Ok(PnlChange {
            change,
            relative_profit,
        })
    }
}
