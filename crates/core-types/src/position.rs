// In crates/core-types/src/position.rs

use crate::Side;
use rust_decimal::Decimal;
use serde::Serialize;

/// The single exposure the simulation may hold at any time.
///
/// `entry_reference` is signed: the entry close for longs, its negation for
/// shorts. The `*Stopped` variants are positions whose protective exit has
/// already fired; they keep their reference for bookkeeping but will not
/// trigger that exit again.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PositionState {
    #[default]
    Flat,
    Long {
        entry_reference: Decimal,
        amount: Decimal,
    },
    /// A long whose protective exit already fired. No rule opens longs with
    /// a stop, so only a caller can hold one; a bearish cross closes it like
    /// a plain `Long`.
    LongStopped {
        entry_reference: Decimal,
        amount: Decimal,
    },
    Short {
        entry_reference: Decimal,
        amount: Decimal,
        stop_exit_price: Decimal,
    },
    ShortStopped {
        entry_reference: Decimal,
        amount: Decimal,
    },
}

impl PositionState {
    pub fn side(&self) -> Option<Side> {
        match self {
            PositionState::Flat => None,
            PositionState::Long { .. } | PositionState::LongStopped { .. } => Some(Side::Long),
            PositionState::Short { .. } | PositionState::ShortStopped { .. } => Some(Side::Short),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    /// Signed entry reference, zero when flat.
    pub fn entry_reference(&self) -> Decimal {
        match *self {
            PositionState::Flat => Decimal::ZERO,
            PositionState::Long { entry_reference, .. }
            | PositionState::LongStopped { entry_reference, .. }
            | PositionState::Short { entry_reference, .. }
            | PositionState::ShortStopped { entry_reference, .. } => entry_reference,
        }
    }

    /// Units of the underlying currently held, zero when flat.
    pub fn amount(&self) -> Decimal {
        match *self {
            PositionState::Flat => Decimal::ZERO,
            PositionState::Long { amount, .. }
            | PositionState::LongStopped { amount, .. }
            | PositionState::Short { amount, .. }
            | PositionState::ShortStopped { amount, .. } => amount,
        }
    }

    /// Protective exit level; only an active `Short` carries one.
    pub fn stop_exit_price(&self) -> Decimal {
        match *self {
            PositionState::Short { stop_exit_price, .. } => stop_exit_price,
            _ => Decimal::ZERO,
        }
    }

    /// The same state holding `amount` units instead. Flat stays flat.
    pub fn with_amount(self, amount: Decimal) -> Self {
        match self {
            PositionState::Flat => PositionState::Flat,
            PositionState::Long { entry_reference, .. } => PositionState::Long { entry_reference, amount },
            PositionState::LongStopped { entry_reference, .. } => {
                PositionState::LongStopped { entry_reference, amount }
            }
            PositionState::Short {
                entry_reference,
                stop_exit_price,
                ..
            } => PositionState::Short {
                entry_reference,
                amount,
                stop_exit_price,
            },
            PositionState::ShortStopped { entry_reference, .. } => {
                PositionState::ShortStopped { entry_reference, amount }
            }
        }
    }

    /// Short name used in logs and exports.
    pub fn label(&self) -> &'static str {
        match self {
            PositionState::Flat => "flat",
            PositionState::Long { .. } => "long",
            PositionState::LongStopped { .. } => "long_stopped",
            PositionState::Short { .. } => "short",
            PositionState::ShortStopped { .. } => "short_stopped",
        }
    }

    /// Mark-to-market value of `cash_equity` plus this position at `close`.
    pub fn mark_to_market(&self, cash_equity: Decimal, close: Decimal) -> Decimal {
        match self.side() {
            Some(Side::Long) => cash_equity + self.amount() * (close - self.entry_reference()),
            Some(Side::Short) => cash_equity - self.amount() * (close + self.entry_reference()),
            None => cash_equity,
        }
    }
}
