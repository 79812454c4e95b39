// In crates/market-data/src/lib.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::{Candle, Symbol};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub mod error;

// Re-export the most important types for easy access.
pub use error::{Error, Result};

/// A row of the exchange candle dump.
///
/// Files carry either an ISO `startTime` column, an epoch-millisecond `time`
/// column, or both; `startTime` wins when present.
#[derive(Debug, Deserialize)]
struct CandleRow {
    #[serde(rename = "startTime", default)]
    start_time: Option<String>,
    #[serde(default)]
    time: Option<f64>,
    #[serde(default)]
    open: Option<Decimal>,
    #[serde(default)]
    high: Option<Decimal>,
    #[serde(default)]
    low: Option<Decimal>,
    close: Decimal,
    #[serde(default)]
    volume: Option<Decimal>,
}

impl CandleRow {
    fn into_candle(self, row: usize) -> Result<Candle> {
        let timestamp = match (&self.start_time, self.time) {
            (Some(value), _) if !value.trim().is_empty() => {
                parse_timestamp(value).map_err(|_| Error::InvalidTimestamp {
                    row,
                    value: value.clone(),
                })?
            }
            (_, Some(millis)) => DateTime::from_timestamp_millis(millis as i64).ok_or_else(|| {
                Error::InvalidTimestamp {
                    row,
                    value: millis.to_string(),
                }
            })?,
            _ => return Err(Error::MissingTimestamp { row }),
        };

        Ok(Candle {
            timestamp,
            open: self.open.unwrap_or(self.close),
            high: self.high.unwrap_or(self.close),
            low: self.low.unwrap_or(self.close),
            close: self.close,
            volume: self.volume.unwrap_or_default(),
        })
    }
}

/// A candle file on disk for one market.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    market: Symbol,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>, market: Symbol) -> Self {
        Self {
            path: path.into(),
            market,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn market(&self) -> &Symbol {
        &self.market
    }

    /// Loads every candle in the file, sorted by time.
    ///
    /// When a timestamp appears more than once the last row wins, so files
    /// that were appended to by overlapping downloads stay usable.
    pub fn load_candles(&self) -> Result<Vec<Candle>> {
        let file = File::open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let mut by_time = BTreeMap::new();
        let mut rows = 0usize;
        for (index, result) in reader.deserialize::<CandleRow>().enumerate() {
            // 1-based, counting the header line
            let candle = result?.into_candle(index + 2)?;
            by_time.insert(candle.timestamp, candle);
            rows += 1;
        }

        let candles: Vec<Candle> = by_time.into_values().collect();
        tracing::info!(
            market = %self.market.0,
            path = %self.path.display(),
            rows,
            candles = candles.len(),
            "Loaded candles."
        );
        Ok(candles)
    }
}

/// Parses a timestamp or a date boundary.
///
/// Accepts RFC 3339 (`2019-08-01T00:00:00+00:00`), the same with a space
/// separator, a naive `2019-08-01T00:00:00` taken as UTC, or a bare
/// `2019-08-01` meaning midnight UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::InvalidBoundary(value.to_string()))
}
