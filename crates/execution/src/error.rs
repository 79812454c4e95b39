// In crates/execution/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Execution failed: {reason}")]
    ExecutionFailed { reason: String },

    #[error("Exit fraction {0} is outside (0, 1]")]
    InvalidFraction(rust_decimal::Decimal),
}

pub type Result<T> = std::result::Result<T, Error>;
