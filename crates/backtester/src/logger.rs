// In crates/backtester/src/logger.rs

use crate::types::{Transition, TransitionKind};
use analytics::EquityPoint;
use chrono::{DateTime, Utc};
use core_types::{Marker, MarkerKind, Side};
use rust_decimal::Decimal;

/// A logger responsible for recording transitions, chart markers and the
/// equity curve during a simulation.
#[derive(Debug, Default)]
pub struct RunLogger {
    pub transitions: Vec<Transition>,
    pub markers: Vec<Marker>,
    pub equity_curve: Vec<EquityPoint>,
    plot_distance: Decimal,
}

impl RunLogger {
    /// Creates a new, empty logger.
    pub fn new(plot_distance: Decimal) -> Self {
        Self {
            transitions: Vec::new(),
            markers: Vec::new(),
            equity_curve: Vec::new(),
            plot_distance,
        }
    }

    /// Records a point in the equity curve.
    pub fn record_equity(&mut self, timestamp: DateTime<Utc>, strategy_value: Decimal, hodl_value: Decimal) {
        self.equity_curve.push(EquityPoint {
            timestamp,
            strategy_value,
            hodl_value,
        });
    }

    /// Records a realized transition along with its chart marker.
    ///
    /// Buy markers sit `plot_distance` below the close, sell markers the
    /// same distance above it; exit markers sit on the close.
    pub fn record_transition(&mut self, transition: Transition) {
        let (kind, price) = match (transition.kind, transition.side) {
            (TransitionKind::Entry, Side::Long) => (MarkerKind::Buy, transition.price - self.plot_distance),
            (TransitionKind::Entry, Side::Short) => (MarkerKind::Sell, transition.price + self.plot_distance),
            _ => (MarkerKind::Exit, transition.price),
        };

        tracing::info!(
            kind = transition.tag(),
            time = %transition.timestamp,
            price = %transition.price,
            cash = %transition.cash_equity.round_dp(4),
            change = %transition.change.round_dp(2),
            rel_profit_pct = %(transition.relative_profit * Decimal::ONE_HUNDRED).round_dp(2),
            "Transition booked."
        );

        self.markers.push(Marker {
            timestamp: transition.timestamp,
            price,
            kind,
        });
        self.transitions.push(transition);
    }
}
