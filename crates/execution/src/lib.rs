// In crates/execution/src/lib.rs

use core_types::Portfolio;
pub mod simulated;
pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::{EntryOrder, Execution, ExitOrder, SimulationSettings};

/// The universal interface for a fill handler.
///
/// An `Executor` turns an entry or exit decision into a fill and books its
/// realized effect on the portfolio. It only ever touches
/// `Portfolio::realized_profit`; folding the change into `cash_equity` is
/// left to the P&L accumulator so every transition is counted exactly once.
pub trait Executor {
    /// The name of the executor (e.g., "SimulatedExecutor").
    fn name(&self) -> &'static str;

    /// Opens a position sized against the portfolio's current cash equity.
    ///
    /// # Returns
    ///
    /// An `Execution` whose `amount` is the size of the new position.
    fn enter(&self, order: &EntryOrder, portfolio: &mut Portfolio) -> Result<Execution>;

    /// Closes `order.fraction` of an open position.
    ///
    /// # Returns
    ///
    /// An `Execution` whose `amount` is the closed size and whose
    /// `remaining_amount` is what is left open afterwards.
    fn exit(&self, order: &ExitOrder, portfolio: &mut Portfolio) -> Result<Execution>;
}
