// In crates/risk/src/lib.rs

use rust_decimal::Decimal;
pub mod simple_manager;

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use simple_manager::SimpleStopManager;
pub use types::StopLossSettings;

/// The universal interface for protective-exit calibration.
///
/// A `StopPolicy` learns from closed long trades and turns that history into
/// the exit level of the next short entry.
pub trait StopPolicy {
    /// The name of the stop policy.
    fn name(&self) -> &'static str;

    /// Feeds back a completed long exit.
    ///
    /// # Arguments
    ///
    /// * `exit_price`: The close at which the long was exited.
    /// * `entry_reference`: The signed entry reference of that long. Only a
    ///   positive reference carries information; anything else is ignored.
    fn record_long_exit(&mut self, exit_price: Decimal, entry_reference: Decimal);

    /// The price at which a short opened at `entry_price` should be exited.
    fn short_stop_price(&self, entry_price: Decimal) -> Decimal;
}
