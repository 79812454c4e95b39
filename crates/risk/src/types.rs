// In crates/risk/src/types.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StopLossSettings {
    /// Stop level as a ratio of the short entry close, used until a long
    /// exit provides a calibrated ratio. 0.995 puts the stop 0.5% below.
    #[serde(default = "default_band")]
    pub default_band: Decimal,
}

impl Default for StopLossSettings {
    fn default() -> Self {
        Self {
            default_band: default_band(),
        }
    }
}

fn default_band() -> Decimal {
    dec!(0.995)
}
