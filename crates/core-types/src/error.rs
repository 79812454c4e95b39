// In crates/core-types/src/error.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Bar series is empty")]
    EmptySeries,

    #[error("Bar {index} at {timestamp} is not later than the previous bar")]
    NonIncreasingTimestamp { index: usize, timestamp: DateTime<Utc> },

    #[error("Bar at {timestamp} has a non-positive close")]
    NonPositiveClose { timestamp: DateTime<Utc> },
}

pub type Result<T> = std::result::Result<T, Error>;
