// In crates/strategies/src/error.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid {name} window: {value} (must be at least 1)")]
    InvalidWindow { name: &'static str, value: usize },

    #[error("Smoothed value at {timestamp} is not a finite number")]
    NonFiniteMean { timestamp: DateTime<Utc> },

    #[error("Indicator error: {0}")]
    Indicator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
