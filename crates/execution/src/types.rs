// In crates/execution/src/types.rs

use core_types::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Fee charged on the notional of every fill (e.g., 0.0006 for 0.06%).
    pub fee_rate: Decimal,

    /// Multiplier applied to cash equity when sizing a position.
    /// 1 means no leverage.
    pub leverage: Decimal,
}

/// A request to open a new position at `price`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOrder {
    pub side: Side,
    pub price: Decimal,
    pub fee_rate: Decimal,
}

/// A request to close part or all of an open position at `price`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitOrder {
    pub side: Side,
    /// Signed entry reference of the position being closed.
    pub entry_reference: Decimal,
    /// Units currently held.
    pub amount: Decimal,
    pub price: Decimal,
    pub fee_rate: Decimal,
    /// Share of `amount` to close, in (0, 1].
    pub fraction: Decimal,
}

/// The booked result of a fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub side: Side,
    pub price: Decimal,
    /// Units opened (entries) or closed (exits).
    pub amount: Decimal,
    /// Units still open after the fill.
    pub remaining_amount: Decimal,
    pub fee: Decimal,
    /// `realized_profit` immediately before this fill.
    pub prior_profit: Decimal,
}
