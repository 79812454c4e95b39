// In crates/strategies/src/lib.rs

use core_types::{Bar, Candle};
pub mod error;
pub mod ewma_cross;
pub mod types;

pub use error::{Error, Result};
pub use ewma_cross::{slice_window, EwmaCrossover};
pub use types::EwmaCrossSettings;

/// The universal interface for a bar annotator.
///
/// A strategy turns raw candles into the bars the simulation engine reads,
/// attaching whatever smoothed values its trading rules compare. It is
/// stateful: indicators keep their running values across candles.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    fn annotate(&mut self, candles: &[Candle]) -> Result<Vec<Bar>>;
}
