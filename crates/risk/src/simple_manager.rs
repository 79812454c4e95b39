// In crates/risk/src/simple_manager.rs

use crate::types::StopLossSettings;
use crate::{Error, Result, StopPolicy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A stop policy driven by the outcome of the most recent long trade.
///
/// After a long is exited, the ratio `exit / entry` is remembered. The next
/// short entry places its stop at `entry * ratio` when that ratio lies
/// strictly between 0 and 1 (the long lost money); otherwise the fixed
/// default band applies.
#[derive(Debug, Clone)]
pub struct SimpleStopManager {
    /// The configuration for this stop manager instance.
    settings: StopLossSettings,
    /// `exit / entry` of the last long that was closed, if any.
    close_loss_ratio: Option<Decimal>,
}

impl SimpleStopManager {
    /// Creates a new `SimpleStopManager` instance from its settings.
    pub fn new(settings: StopLossSettings) -> Result<Self> {
        if settings.default_band <= Decimal::ZERO || settings.default_band > dec!(1) {
            return Err(Error::InvalidParameters(format!(
                "default_band must be in (0, 1], got {}",
                settings.default_band
            )));
        }

        Ok(Self {
            settings,
            close_loss_ratio: None,
        })
    }

    pub fn close_loss_ratio(&self) -> Option<Decimal> {
        self.close_loss_ratio
    }
}

impl StopPolicy for SimpleStopManager {
    fn name(&self) -> &'static str {
        "SimpleStopManager"
    }

    fn record_long_exit(&mut self, exit_price: Decimal, entry_reference: Decimal) {
        if entry_reference > Decimal::ZERO {
            let ratio = exit_price / entry_reference;
            tracing::debug!(%ratio, "Calibrated close/loss ratio from long exit.");
            self.close_loss_ratio = Some(ratio);
        }
    }

    fn short_stop_price(&self, entry_price: Decimal) -> Decimal {
        match self.close_loss_ratio {
            Some(ratio) if ratio > Decimal::ZERO && ratio < dec!(1) => entry_price * ratio,
            _ => entry_price * self.settings.default_band,
        }
    }
}
