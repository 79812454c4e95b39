// In crates/strategies/src/ewma_cross.rs

use crate::types::EwmaCrossSettings;
use crate::{Error, Result, Strategy};
use chrono::{DateTime, Utc};
use core_types::{Bar, Candle};
use num_traits::cast::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use ta::indicators::ExponentialMovingAverage as Ema;
use ta::Next;

/// Annotates candles with a slow and a fast exponentially weighted mean of
/// the close. The crossover itself is traded by the backtester.
///
/// The means are the recursive form `m = a * close + (1 - a) * m` with
/// `a = 2 / (span + 1)`, seeded with the first close. During the first few
/// spans this sits closer to the seed than the bias-adjusted mean
/// (`sum of (1 - a)^i * close / sum of (1 - a)^i`), so early crossovers can
/// land on different bars than with the adjusted form. Annotate from well
/// before the simulated window to stay clear of the warm-up.
#[derive(Debug)]
pub struct EwmaCrossover {
    /// The configuration for this strategy instance.
    settings: EwmaCrossSettings,
    slow_ema: Ema,
    fast_ema: Ema,
}

impl EwmaCrossover {
    /// Creates a new `EwmaCrossover` from its settings.
    pub fn new(settings: EwmaCrossSettings) -> Result<Self> {
        let slow_ema = build_ema("slow", settings.slow_window)?;
        let fast_ema = build_ema("fast", settings.fast_window)?;
        Ok(Self {
            settings,
            slow_ema,
            fast_ema,
        })
    }

    pub fn settings(&self) -> &EwmaCrossSettings {
        &self.settings
    }
}

fn build_ema(name: &'static str, window: usize) -> Result<Ema> {
    if window == 0 {
        return Err(Error::InvalidWindow { name, value: window });
    }
    Ema::new(window).map_err(|e| Error::Indicator(format!("{e:?}")))
}

impl Strategy for EwmaCrossover {
    fn name(&self) -> &'static str {
        "EwmaCrossover"
    }

    /// Feeds every close through both means, in order.
    ///
    /// The means keep their state between calls, so a second call continues
    /// the same series rather than starting over.
    fn annotate(&mut self, candles: &[Candle]) -> Result<Vec<Bar>> {
        let mut bars = Vec::with_capacity(candles.len());

        for candle in candles {
            let close = candle
                .close
                .to_f64()
                .ok_or(Error::NonFiniteMean { timestamp: candle.timestamp })?;

            let mean_slow = to_decimal(self.slow_ema.next(close), candle.timestamp)?;
            let mean_fast = to_decimal(self.fast_ema.next(close), candle.timestamp)?;

            bars.push(Bar {
                timestamp: candle.timestamp,
                close: candle.close,
                mean_slow,
                mean_fast,
            });
        }

        tracing::debug!(
            strategy = self.name(),
            slow = self.settings.slow_window,
            fast = self.settings.fast_window,
            bars = bars.len(),
            "Annotated candles."
        );
        Ok(bars)
    }
}

fn to_decimal(value: f64, timestamp: DateTime<Utc>) -> Result<Decimal> {
    Decimal::from_f64(value).ok_or(Error::NonFiniteMean { timestamp })
}

/// Keeps the bars within `[from, to]`, both ends inclusive and optional.
///
/// Slicing happens after annotation so the means are warmed up on the
/// whole history.
pub fn slice_window(bars: Vec<Bar>, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Vec<Bar> {
    bars.into_iter()
        .filter(|bar| from.is_none_or(|from| bar.timestamp >= from))
        .filter(|bar| to.is_none_or(|to| bar.timestamp <= to))
        .collect()
}
