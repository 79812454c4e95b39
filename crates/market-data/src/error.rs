// In crates/market-data/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open candle file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed candle file")]
    Csv(#[from] csv::Error),
    #[error("Row {row} has no startTime or time column")]
    MissingTimestamp { row: usize },
    #[error("Row {row} has an unreadable timestamp: {value}")]
    InvalidTimestamp { row: usize, value: String },
    #[error("Unreadable date boundary: {0}")]
    InvalidBoundary(String),
}

pub type Result<T> = std::result::Result<T, Error>;
