pub mod error;
pub mod logger;
pub mod types;

pub use error::{Error, Result};
pub use types::{BacktestSettings, SimulationOutcome, Transition, TransitionKind};

use analytics::{AnalyticsEngine, EquityPoint, PnlAccumulator, RunStatistics, SummaryReport};
use chrono::{DateTime, Utc};
use core_types::{Bar, Marker, Portfolio, PositionState, Side};
use execution::simulated::SimulatedExecutor;
use execution::{EntryOrder, Execution, Executor, ExitOrder, SimulationSettings};
use logger::RunLogger;
use risk::{SimpleStopManager, StopLossSettings, StopPolicy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The main engine for running historical backtests of the EWMA crossover.
///
/// A `Backtester` is a single run: it owns the position, the portfolio and
/// every accumulator, and is driven one bar at a time through [`step`].
/// [`run`] validates a whole series up front and folds it.
///
/// [`step`]: Backtester::step
/// [`run`]: Backtester::run
pub struct Backtester {
    settings: BacktestSettings,
    /// The fill simulator.
    executor: Box<dyn Executor + Send>,
    /// Calibrates the stop level of short entries.
    stop_policy: Box<dyn StopPolicy + Send>,
    portfolio: Portfolio,
    accumulator: PnlAccumulator,
    state: PositionState,
    logger: RunLogger,
    first_close: Option<Decimal>,
    last_bar: Option<(DateTime<Utc>, Decimal)>,
    halted: bool,
}

impl Backtester {
    pub fn new(
        settings: BacktestSettings,
        executor: Box<dyn Executor + Send>,
        stop_policy: Box<dyn StopPolicy + Send>,
    ) -> Result<Self> {
        validate_settings(&settings)?;

        Ok(Self {
            portfolio: Portfolio::new(settings.initial_equity),
            logger: RunLogger::new(settings.plot_distance),
            settings,
            executor,
            stop_policy,
            accumulator: PnlAccumulator::new(),
            state: PositionState::Flat,
            first_close: None,
            last_bar: None,
            halted: false,
        })
    }

    /// Builds a backtester with the simulated executor and the simple stop manager.
    pub fn from_settings(settings: BacktestSettings, stop_settings: StopLossSettings) -> Result<Self> {
        validate_settings(&settings)?;
        let executor = SimulatedExecutor::new(SimulationSettings {
            fee_rate: settings.fee_rate,
            leverage: settings.leverage,
        });
        let stop_policy = SimpleStopManager::new(stop_settings)?;
        Self::new(settings, Box::new(executor), Box::new(stop_policy))
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn stats(&self) -> &RunStatistics {
        self.accumulator.stats()
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.logger.equity_curve
    }

    pub fn markers(&self) -> &[Marker] {
        &self.logger.markers
    }

    /// True once the portfolio has been exhausted; further bars are ignored.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Runs the whole series and produces the outcome.
    ///
    /// The series is validated before anything is simulated. The loop stops
    /// after the first bar that leaves the portfolio exhausted.
    pub fn run(mut self, bars: &[Bar]) -> Result<SimulationOutcome> {
        Bar::validate_series(bars)?;
        tracing::info!(
            bars = bars.len(),
            executor = self.executor.name(),
            stop_policy = self.stop_policy.name(),
            "Starting simulation."
        );

        for bar in bars {
            self.step(bar)?;
            if self.halted {
                break;
            }
        }

        let last_close = bars.last().map(|b| b.close).unwrap_or_default();
        Ok(self.finalize(last_close))
    }

    /// Consumes the backtester after manual stepping. The hodl return is
    /// measured up to the last processed bar.
    pub fn finish(self) -> SimulationOutcome {
        let last_close = self.last_bar.map(|(_, close)| close).unwrap_or_default();
        self.finalize(last_close)
    }

    /// Processes one bar and returns the transitions it realized.
    ///
    /// Rules are applied in a fixed order and each one sees the state left
    /// by the previous ones:
    /// 1. long exit when fast < slow,
    /// 2. short exit when fast > slow (a stopped short only goes flat),
    /// 3. fee-free short exit when the close reaches the stop level,
    /// 4. long entry from flat when slow < fast,
    /// 5. short entry from flat when slow > fast.
    ///
    /// Entries are skipped once the cash is gone. The bar's equity point is
    /// recorded afterwards, transition or not.
    pub fn step(&mut self, bar: &Bar) -> Result<Vec<Transition>> {
        if self.halted {
            return Ok(Vec::new());
        }
        self.check_bar(bar)?;

        let first_close = *self.first_close.get_or_insert(bar.close);
        let fee_rate = self.settings.fee_rate;
        let mut transitions = Vec::new();

        // --- 1. Long exit on bearish cross ---
        if matches!(self.state, PositionState::Long { .. } | PositionState::LongStopped { .. })
            && bar.mean_fast < bar.mean_slow
        {
            let entry_reference = self.state.entry_reference();
            if let Some((transition, _)) = self.exit_position(bar, TransitionKind::Exit, fee_rate, dec!(1))? {
                transitions.push(transition);
            }
            self.state = PositionState::Flat;
            self.stop_policy.record_long_exit(bar.close, entry_reference);
        }

        // --- 2. Short exit on bullish cross ---
        if matches!(self.state, PositionState::Short { .. } | PositionState::ShortStopped { .. })
            && bar.mean_fast > bar.mean_slow
        {
            if matches!(self.state, PositionState::Short { .. }) {
                if let Some((transition, _)) =
                    self.exit_position(bar, TransitionKind::Exit, fee_rate, dec!(1))?
                {
                    transitions.push(transition);
                }
            }
            self.state = PositionState::Flat;
        }

        // --- 3. Short stop ---
        if let PositionState::Short {
            entry_reference,
            amount,
            stop_exit_price,
        } = self.state
        {
            if bar.close <= stop_exit_price {
                let remaining = match self.exit_position(bar, TransitionKind::StopExit, Decimal::ZERO, dec!(1))? {
                    Some((transition, remaining)) => {
                        transitions.push(transition);
                        remaining
                    }
                    None => amount,
                };
                self.state = PositionState::ShortStopped {
                    entry_reference,
                    amount: remaining,
                };
            }
        }

        // --- 4./5. Entries from flat ---
        // An exhausted portfolio takes on no new exposure.
        let can_enter = !self.portfolio.is_exhausted();
        if can_enter && self.state.is_flat() && bar.mean_slow < bar.mean_fast {
            transitions.push(self.enter_position(bar, Side::Long)?);
        }
        if can_enter && self.state.is_flat() && bar.mean_slow > bar.mean_fast {
            transitions.push(self.enter_position(bar, Side::Short)?);
        }

        // --- Equity curve ---
        let strategy_value = self.state.mark_to_market(self.portfolio.cash_equity, bar.close);
        let hodl_value = hodl_value(
            self.portfolio.initial_equity,
            self.settings.leverage,
            first_close,
            bar.close,
        )
        .ok_or(Error::Overflow {
            timestamp: bar.timestamp,
            what: "hodl value",
        })?;
        self.logger.record_equity(bar.timestamp, strategy_value, hodl_value);
        self.last_bar = Some((bar.timestamp, bar.close));

        self.check_exhaustion(bar.timestamp);
        Ok(transitions)
    }

    /// Closes `fraction` of the open position at the bar's close, paying the
    /// configured fee. The position keeps its state and holds the rescaled
    /// remaining amount; nothing happens when flat.
    ///
    /// The bar must follow the last processed one and is consumed by the
    /// exit, so it cannot be stepped afterwards. Closing everything leaves
    /// the position flat, as a crossover exit would.
    pub fn exit_partial(&mut self, bar: &Bar, fraction: Decimal) -> Result<Option<Transition>> {
        if self.halted || self.state.is_flat() {
            return Ok(None);
        }
        self.check_bar(bar)?;

        let entry_reference = self.state.entry_reference();
        let was_long = self.state.side() == Some(Side::Long);
        let Some((transition, remaining)) =
            self.exit_position(bar, TransitionKind::PartialExit, self.settings.fee_rate, fraction)?
        else {
            return Ok(None);
        };

        if remaining.is_zero() {
            self.state = PositionState::Flat;
            if was_long {
                self.stop_policy.record_long_exit(bar.close, entry_reference);
            }
        } else {
            self.state = self.state.with_amount(remaining);
        }
        self.last_bar = Some((bar.timestamp, bar.close));

        self.check_exhaustion(bar.timestamp);
        Ok(Some(transition))
    }

    fn check_bar(&self, bar: &Bar) -> Result<()> {
        if bar.close <= Decimal::ZERO {
            return Err(Error::invalid_input(format!(
                "bar at {} has a non-positive close",
                bar.timestamp
            )));
        }
        if let Some((last_timestamp, _)) = self.last_bar {
            if bar.timestamp <= last_timestamp {
                return Err(Error::invalid_input(format!(
                    "bar at {} does not follow {}",
                    bar.timestamp, last_timestamp
                )));
            }
        }
        Ok(())
    }

    fn check_exhaustion(&mut self, timestamp: DateTime<Utc>) {
        if !self.halted && self.portfolio.is_exhausted() {
            self.halted = true;
            tracing::warn!(
                time = %timestamp,
                cash = %self.portfolio.cash_equity,
                "Portfolio exhausted. Halting simulation."
            );
        }
    }

    fn enter_position(&mut self, bar: &Bar, side: Side) -> Result<Transition> {
        let order = EntryOrder {
            side,
            price: bar.close,
            fee_rate: self.settings.fee_rate,
        };
        let fill = self
            .executor
            .enter(&order, &mut self.portfolio)
            .map_err(|source| Error::Execution {
                timestamp: bar.timestamp,
                source,
            })?;

        let entry_reference = match side {
            Side::Long => bar.close,
            Side::Short => -bar.close,
        };
        let transition = self.book(bar, TransitionKind::Entry, entry_reference, &fill)?;

        self.state = match side {
            Side::Long => PositionState::Long {
                entry_reference,
                amount: fill.amount,
            },
            Side::Short => PositionState::Short {
                entry_reference,
                amount: fill.amount,
                stop_exit_price: self.stop_policy.short_stop_price(bar.close),
            },
        };
        Ok(transition)
    }

    /// Exits part of the current position. Returns the booked transition and
    /// the amount left open, or `None` when there is no reference to close
    /// against.
    fn exit_position(
        &mut self,
        bar: &Bar,
        kind: TransitionKind,
        fee_rate: Decimal,
        fraction: Decimal,
    ) -> Result<Option<(Transition, Decimal)>> {
        let Some(side) = self.state.side() else {
            return Ok(None);
        };
        let entry_reference = self.state.entry_reference();
        if entry_reference.is_zero() {
            return Ok(None);
        }

        let order = ExitOrder {
            side,
            entry_reference,
            amount: self.state.amount(),
            price: bar.close,
            fee_rate,
            fraction,
        };
        let fill = self
            .executor
            .exit(&order, &mut self.portfolio)
            .map_err(|source| Error::Execution {
                timestamp: bar.timestamp,
                source,
            })?;

        let transition = self.book(bar, kind, entry_reference, &fill)?;
        Ok(Some((transition, fill.remaining_amount)))
    }

    /// Folds a fill into the accumulator and the logs.
    fn book(&mut self, bar: &Bar, kind: TransitionKind, value: Decimal, fill: &Execution) -> Result<Transition> {
        let pnl = self
            .accumulator
            .record(&mut self.portfolio, fill.side, value, fill.amount, fill.prior_profit)
            .map_err(|source| Error::InvalidPositionValue {
                timestamp: bar.timestamp,
                source,
            })?;

        let transition = Transition {
            timestamp: bar.timestamp,
            kind,
            side: fill.side,
            price: fill.price,
            amount: fill.amount,
            fee: fill.fee,
            change: pnl.change,
            relative_profit: pnl.relative_profit,
            cash_equity: self.portfolio.cash_equity,
        };
        self.logger.record_transition(transition.clone());
        Ok(transition)
    }

    fn finalize(self, last_close: Decimal) -> SimulationOutcome {
        let stats = self.accumulator.stats().clone();
        let summary = AnalyticsEngine::new().summarize(
            &self.portfolio,
            &stats,
            &self.logger.equity_curve,
            self.first_close.unwrap_or_default(),
            last_close,
            self.halted,
        );

        tracing::info!(
            trades = summary.trade_count,
            profit = %summary.absolute_profit,
            halted = summary.halted_early,
            final_state = self.state.label(),
            "Backtest finished."
        );

        SimulationOutcome {
            summary,
            stats,
            final_state: self.state,
            transitions: self.logger.transitions,
            markers: self.logger.markers,
            equity_curve: self.logger.equity_curve,
        }
    }
}

fn validate_settings(settings: &BacktestSettings) -> Result<()> {
    if settings.fee_rate < Decimal::ZERO || settings.fee_rate >= dec!(1) {
        return Err(Error::invalid_input(format!(
            "fee_rate must be in [0, 1), got {}",
            settings.fee_rate
        )));
    }
    if settings.leverage <= Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "leverage must be positive, got {}",
            settings.leverage
        )));
    }
    if settings.initial_equity <= Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "initial_equity must be positive, got {}",
            settings.initial_equity
        )));
    }
    if settings.plot_distance < Decimal::ZERO {
        return Err(Error::invalid_input(format!(
            "plot_distance must not be negative, got {}",
            settings.plot_distance
        )));
    }
    Ok(())
}

/// Value of holding the underlying with leverage from the first close on.
fn hodl_value(initial_equity: Decimal, leverage: Decimal, first_close: Decimal, close: Decimal) -> Option<Decimal> {
    close
        .checked_div(first_close)
        .and_then(|ratio| leverage.checked_mul(ratio - dec!(1)))
        .and_then(|exposure| exposure.checked_add(dec!(1)))
        .and_then(|growth| initial_equity.checked_mul(growth))
}

/// Helper function to print the summary report in a readable format.
pub fn print_report(report: &SummaryReport) {
    println!("\n--- Backtest Summary Report ---");
    println!("-----------------------------------");
    println!("Number of trades:        {}", report.trade_count);
    println!("Absolute profit:         {}", report.absolute_profit.round_dp(4));
    println!("Relative profit:         {:.2} %", report.relative_profit_pct);
    println!("Relative hodl profit:    {:.2} %", report.hodl_relative_profit_pct);
    println!("Average relative profit: {:.2} %", report.average_relative_profit_pct);
    println!("-----------------------------------");
    println!("Largest single change:   {}", report.max_single_change.round_dp(4));
    println!("Smallest single change:  {}", report.min_single_change.round_dp(4));
    println!("Max drawdown:            {} ({:.2} %)", report.max_drawdown_absolute.round_dp(2), report.max_drawdown_percentage);
    println!("Hodl max drawdown:       {:.2} %", report.hodl_max_drawdown_percentage);
    println!("Final strategy value:    {}", report.final_strategy_value.round_dp(2));
    println!("Bars processed:          {}", report.bars_processed);
    if report.halted_early {
        println!("Run halted early: portfolio exhausted.");
    }
    println!("-----------------------------------");
}
