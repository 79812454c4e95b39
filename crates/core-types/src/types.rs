// In crates/core-types/src/types.rs

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A market identifier, e.g. "BTC-PERP".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

/// The direction of an exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

/// A raw OHLCV row as stored on disk, before any indicator is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// One sampled observation of price and the two smoothed trend values.
///
/// The simulation engine only ever reads bars; they are produced upstream
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
    pub mean_slow: Decimal,
    pub mean_fast: Decimal,
}

impl Bar {
    /// Checks that a series is non-empty, strictly increasing in time and
    /// carries a positive close on every bar.
    pub fn validate_series(bars: &[Bar]) -> Result<()> {
        if bars.is_empty() {
            return Err(Error::EmptySeries);
        }

        for (index, bar) in bars.iter().enumerate() {
            if bar.close <= Decimal::ZERO {
                return Err(Error::NonPositiveClose { timestamp: bar.timestamp });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(Error::NonIncreasingTimestamp {
                    index,
                    timestamp: bar.timestamp,
                });
            }
        }

        Ok(())
    }
}

/// What a chart marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Buy,
    Sell,
    Exit,
}

/// A point to draw on the price chart for every realized transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub kind: MarkerKind,
}

/// Cash side of the simulated account.
///
/// `cash_equity` only moves when profit is realized; mark-to-market swings
/// are tracked separately by the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portfolio {
    /// The equity the run started with.
    pub initial_equity: Decimal,
    /// Starting equity plus every realized change so far.
    pub cash_equity: Decimal,
    /// Running sum of realized profit, fees included.
    pub realized_profit: Decimal,
}

impl Portfolio {
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            initial_equity,
            cash_equity: initial_equity,
            realized_profit: Decimal::ZERO,
        }
    }

    /// A run cannot continue once there is no equity left to size against.
    pub fn is_exhausted(&self) -> bool {
        self.cash_equity <= Decimal::ZERO
    }
}
