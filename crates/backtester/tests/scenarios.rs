//! End-to-end scenarios for the crossover simulation.

use backtester::{BacktestSettings, Backtester, Error, TransitionKind};
use chrono::{Duration, TimeZone, Utc};
use core_types::{Bar, Portfolio, PositionState, Side};
use execution::{EntryOrder, Execution, Executor, ExitOrder};
use risk::{SimpleStopManager, StopLossSettings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Helper: one bar per minute starting at a fixed instant.
fn bar(index: i64, close: Decimal, slow: Decimal, fast: Decimal) -> Bar {
    Bar {
        timestamp: Utc.with_ymd_and_hms(2019, 8, 1, 0, 0, 0).unwrap() + Duration::minutes(index),
        close,
        mean_slow: slow,
        mean_fast: fast,
    }
}

/// Helper: bars whose fast mean sits above the slow mean.
fn bullish(index: i64, close: Decimal) -> Bar {
    bar(index, close, close - dec!(1), close + dec!(1))
}

/// Helper: bars whose fast mean sits below the slow mean.
fn bearish(index: i64, close: Decimal) -> Bar {
    bar(index, close, close + dec!(1), close - dec!(1))
}

fn settings(fee_rate: Decimal, leverage: Decimal) -> BacktestSettings {
    BacktestSettings {
        fee_rate,
        leverage,
        initial_equity: dec!(1000),
        plot_distance: dec!(0.1),
    }
}

fn backtester(fee_rate: Decimal, leverage: Decimal) -> Backtester {
    Backtester::from_settings(settings(fee_rate, leverage), StopLossSettings::default()).unwrap()
}

// ──────────────────────────────────────────────
// Scenario A: permanent uptrend
// ──────────────────────────────────────────────

#[test]
fn uptrend_enters_long_once_and_holds() {
    let bars: Vec<Bar> = (0..20).map(|i| bullish(i, dec!(100) + Decimal::from(i))).collect();

    let outcome = backtester(dec!(0.0006), dec!(1)).run(&bars).unwrap();

    assert_eq!(outcome.summary.trade_count, 1);
    assert_eq!(outcome.transitions.len(), 1);
    assert_eq!(outcome.transitions[0].timestamp, bars[0].timestamp);
    assert_eq!(outcome.transitions[0].kind, TransitionKind::Entry);
    assert!(matches!(outcome.final_state, PositionState::Long { .. }));
    assert_eq!(outcome.equity_curve.len(), bars.len());
    assert!(!outcome.summary.halted_early);
}

// ──────────────────────────────────────────────
// Scenario B: single crossover
// ──────────────────────────────────────────────

#[test]
fn single_crossover_reverses_long_into_short() {
    let k = 6;
    let bars: Vec<Bar> = (0..12)
        .map(|i| {
            if i < k {
                bullish(i, dec!(100))
            } else {
                bearish(i, dec!(100))
            }
        })
        .collect();

    let outcome = backtester(dec!(0.0006), dec!(1)).run(&bars).unwrap();

    let entries: Vec<_> = outcome
        .transitions
        .iter()
        .filter(|t| t.kind == TransitionKind::Entry)
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].side, Side::Long);
    assert!(entries[0].timestamp < bars[k as usize].timestamp);
    assert_eq!(entries[1].side, Side::Short);
    assert_eq!(entries[1].timestamp, bars[k as usize].timestamp);

    // long exit, then short entry, on the crossover bar
    assert_eq!(outcome.transitions.len(), 3);
    assert_eq!(outcome.transitions[1].kind, TransitionKind::Exit);
    assert_eq!(outcome.transitions[1].side, Side::Long);
    assert_eq!(outcome.summary.trade_count, 3);
}

// ──────────────────────────────────────────────
// Scenario C: short stop
// ──────────────────────────────────────────────

#[test]
fn short_stop_exits_without_fee() {
    let bars = vec![bearish(0, dec!(100)), bearish(1, dec!(60)), bearish(2, dec!(55))];

    let mut bt = backtester(dec!(0), dec!(1));
    bt.step(&bars[0]).unwrap();
    assert_eq!(bt.state().stop_exit_price(), dec!(99.5));
    let amount = bt.state().amount();
    assert_eq!(amount, dec!(10));

    let transitions = bt.step(&bars[1]).unwrap();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].kind, TransitionKind::StopExit);
    assert_eq!(transitions[0].fee, Decimal::ZERO);
    assert_eq!(bt.portfolio().realized_profit, amount * (dec!(100) - dec!(60)));
    assert!(matches!(bt.state(), PositionState::ShortStopped { .. }));

    // a stopped short does not stop out again
    let transitions = bt.step(&bars[2]).unwrap();
    assert!(transitions.is_empty());
    assert_eq!(bt.stats().trade_count, 2);
}

#[test]
fn short_stop_ignores_the_configured_fee() {
    let mut bt = backtester(dec!(0.01), dec!(1));
    bt.step(&bearish(0, dec!(100))).unwrap();
    let after_entry = bt.portfolio().realized_profit;

    bt.step(&bearish(1, dec!(60))).unwrap();

    // only the price move is booked: 10 * (100 - 60)
    assert_eq!(bt.portfolio().realized_profit - after_entry, dec!(400));
}

// ──────────────────────────────────────────────
// Scenario D: portfolio exhaustion
// ──────────────────────────────────────────────

#[test]
fn exhausted_portfolio_halts_after_the_losing_bar() {
    let bars = vec![
        bullish(0, dec!(100)),
        bearish(1, dec!(85)),
        bearish(2, dec!(80)),
        bullish(3, dec!(90)),
    ];

    let outcome = backtester(dec!(0), dec!(10)).run(&bars).unwrap();

    // 100 units lose 15 each: 1000 - 1500
    assert_eq!(outcome.summary.final_cash_equity, dec!(-500));
    assert!(outcome.summary.halted_early);
    assert_eq!(outcome.equity_curve.len(), 2);
    assert!(outcome.equity_curve.len() < bars.len());
    assert_eq!(outcome.summary.bars_processed, 2);
    // no new exposure once the cash is gone
    assert!(outcome.final_state.is_flat());
    assert_eq!(outcome.summary.trade_count, 2);
}

#[test]
fn halted_backtester_ignores_further_bars() {
    let mut bt = backtester(dec!(0), dec!(10));
    bt.step(&bullish(0, dec!(100))).unwrap();
    bt.step(&bearish(1, dec!(85))).unwrap();
    assert!(bt.is_halted());

    assert!(bt.step(&bullish(2, dec!(120))).unwrap().is_empty());
    assert_eq!(bt.equity_curve().len(), 2);
}

// ──────────────────────────────────────────────
// Scenario E: partial exit
// ──────────────────────────────────────────────

#[test]
fn partial_exit_follows_the_literal_rescaling() {
    let mut bt = backtester(dec!(0), dec!(1));
    bt.step(&bullish(0, dec!(100))).unwrap();
    assert_eq!(bt.state().amount(), dec!(10));

    let transition = bt
        .exit_partial(&bullish(1, dec!(110)), dec!(0.5))
        .unwrap()
        .expect("an open long can be partially exited");

    assert_eq!(transition.kind, TransitionKind::PartialExit);
    assert_eq!(transition.amount, dec!(5));
    // 10 * 0.5 / 0.5 * (1 - 0.5)
    assert_eq!(bt.state().amount(), dec!(5));
    assert!(matches!(bt.state(), PositionState::Long { .. }));
    assert_eq!(bt.portfolio().realized_profit, dec!(50));
    assert_eq!(bt.stats().trade_count, 2);
}

#[test]
fn partial_exit_when_flat_is_a_no_op() {
    let mut bt = backtester(dec!(0), dec!(1));
    assert!(bt.exit_partial(&bullish(0, dec!(100)), dec!(0.5)).unwrap().is_none());
    assert_eq!(bt.stats().trade_count, 0);
}

#[test]
fn closing_everything_goes_flat_and_the_next_cross_trades_normally() {
    let mut bt = backtester(dec!(0), dec!(1));
    bt.step(&bullish(0, dec!(100))).unwrap();

    let transition = bt.exit_partial(&bullish(1, dec!(110)), dec!(1)).unwrap().unwrap();
    assert_eq!(transition.amount, dec!(10));
    assert!(bt.state().is_flat());
    assert_eq!(bt.portfolio().realized_profit, dec!(100));

    let transitions = bt.step(&bearish(2, dec!(120))).unwrap();
    assert_eq!(transitions.len(), 1);
    assert_eq!((transitions[0].kind, transitions[0].side), (TransitionKind::Entry, Side::Short));
    assert_eq!(bt.state().entry_reference(), dec!(-120));
    // a winning long keeps the default band
    assert_eq!(bt.state().stop_exit_price(), dec!(119.4));
    assert_eq!(bt.stats().trade_count, 3);
}

#[test]
fn closing_a_losing_long_in_full_tightens_the_next_short_stop() {
    let mut bt = backtester(dec!(0), dec!(1));
    bt.step(&bullish(0, dec!(100))).unwrap();
    bt.exit_partial(&bullish(1, dec!(80)), dec!(1)).unwrap();
    bt.step(&bearish(2, dec!(80))).unwrap();

    assert_eq!(bt.state().stop_exit_price(), dec!(64));
}

#[test]
fn partial_exit_rejects_bars_that_do_not_follow_the_last_one() {
    let mut bt = backtester(dec!(0), dec!(1));
    bt.step(&bullish(5, dec!(100))).unwrap();

    let result = bt.exit_partial(&bullish(0, dec!(110)), dec!(0.5));
    assert!(matches!(result, Err(Error::InvalidInput { .. })));
    assert_eq!(bt.state().amount(), dec!(10));
    assert_eq!(bt.stats().trade_count, 1);
    assert_eq!(bt.markers().len(), 1);

    // the exit consumes its bar
    bt.exit_partial(&bullish(6, dec!(110)), dec!(0.5)).unwrap();
    assert!(matches!(bt.step(&bullish(6, dec!(110))), Err(Error::InvalidInput { .. })));
}

// ──────────────────────────────────────────────
// Leverage and input validation
// ──────────────────────────────────────────────

#[test]
fn non_positive_leverage_is_invalid_input() {
    for leverage in [dec!(0), dec!(-2)] {
        let result = Backtester::from_settings(settings(dec!(0), leverage), StopLossSettings::default());
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }
}

#[test]
fn unit_leverage_sizes_against_plain_equity() {
    let mut bt = backtester(dec!(0), dec!(1));
    bt.step(&bullish(0, dec!(250))).unwrap();
    assert_eq!(bt.state().amount(), dec!(1000) / dec!(250));

    let mut levered = backtester(dec!(0), dec!(3));
    levered.step(&bullish(0, dec!(250))).unwrap();
    assert_eq!(levered.state().amount(), dec!(12));
}

#[test]
fn oversized_leverage_fails_the_entry_without_panicking() {
    let mut bt = backtester(dec!(0.0006), Decimal::MAX);

    let result = bt.step(&bullish(0, dec!(100)));
    assert!(matches!(result, Err(Error::Execution { .. })));
    assert!(bt.state().is_flat());
    assert_eq!(bt.stats().trade_count, 0);
}

#[test]
fn oversized_leverage_fails_the_hodl_line_without_panicking() {
    let mut bt = backtester(dec!(0), Decimal::MAX);
    bt.step(&bar(0, dec!(100), dec!(100), dec!(100))).unwrap();

    let result = bt.step(&bar(1, dec!(300), dec!(300), dec!(300)));
    assert!(matches!(result, Err(Error::Overflow { what: "hodl value", .. })));
}

#[test]
fn hodl_baseline_is_leveraged() {
    let bars = vec![bullish(0, dec!(100)), bullish(1, dec!(110))];
    let outcome = backtester(dec!(0), dec!(2)).run(&bars).unwrap();

    assert_eq!(outcome.equity_curve[0].hodl_value, dec!(1000));
    assert_eq!(outcome.equity_curve[1].hodl_value, dec!(1200));
    // the reported hodl return is the plain price change
    assert_eq!(outcome.summary.hodl_relative_profit_pct, dec!(10));
}

#[test]
fn empty_or_unordered_series_is_rejected_before_simulation() {
    assert!(matches!(
        backtester(dec!(0), dec!(1)).run(&[]),
        Err(Error::InvalidInput { .. })
    ));

    let bars = vec![bullish(1, dec!(100)), bullish(0, dec!(101))];
    assert!(matches!(
        backtester(dec!(0), dec!(1)).run(&bars),
        Err(Error::InvalidInput { .. })
    ));
}

// ──────────────────────────────────────────────
// Zero-valued positions
// ──────────────────────────────────────────────

/// An executor that fills entries with nothing.
struct EmptyFillExecutor;

impl Executor for EmptyFillExecutor {
    fn name(&self) -> &'static str {
        "EmptyFillExecutor"
    }

    fn enter(&self, order: &EntryOrder, portfolio: &mut Portfolio) -> execution::Result<Execution> {
        Ok(Execution {
            side: order.side,
            price: order.price,
            amount: Decimal::ZERO,
            remaining_amount: Decimal::ZERO,
            fee: Decimal::ZERO,
            prior_profit: portfolio.realized_profit,
        })
    }

    fn exit(&self, order: &ExitOrder, portfolio: &mut Portfolio) -> execution::Result<Execution> {
        Ok(Execution {
            side: order.side,
            price: order.price,
            amount: Decimal::ZERO,
            remaining_amount: Decimal::ZERO,
            fee: Decimal::ZERO,
            prior_profit: portfolio.realized_profit,
        })
    }
}

#[test]
fn zero_position_value_reports_the_offending_bar() {
    let stops = SimpleStopManager::new(StopLossSettings::default()).unwrap();
    let bt = Backtester::new(settings(dec!(0), dec!(1)), Box::new(EmptyFillExecutor), Box::new(stops)).unwrap();
    let bars = vec![bar(0, dec!(100), dec!(100), dec!(100)), bullish(1, dec!(100))];

    let err = bt.run(&bars).unwrap_err();

    match err {
        Error::InvalidPositionValue { timestamp, .. } => assert_eq!(timestamp, bars[1].timestamp),
        other => panic!("unexpected error: {other:?}"),
    }
}
