// In crates/backtester/src/error.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Rejected before the first bar is simulated.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Invalid position value at {timestamp}: {source}")]
    InvalidPositionValue {
        timestamp: DateTime<Utc>,
        #[source]
        source: analytics::Error,
    },

    #[error("Execution failed at {timestamp}: {source}")]
    Execution {
        timestamp: DateTime<Utc>,
        #[source]
        source: execution::Error,
    },

    #[error("{what} overflowed at {timestamp}")]
    Overflow {
        timestamp: DateTime<Utc>,
        what: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<core_types::Error> for Error {
    fn from(err: core_types::Error) -> Self {
        Error::invalid_input(err.to_string())
    }
}

impl From<risk::Error> for Error {
    fn from(err: risk::Error) -> Self {
        Error::invalid_input(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
