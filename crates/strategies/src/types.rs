// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

/// Spans of the two exponentially weighted means, in bars.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EwmaCrossSettings {
    /// Long-horizon trend. 4320 one-minute bars is three days.
    pub slow_window: usize,
    /// Short-horizon trend.
    pub fast_window: usize,
}

impl Default for EwmaCrossSettings {
    fn default() -> Self {
        Self {
            slow_window: 4320,
            fast_window: 240,
        }
    }
}
