// In crates/analytics/src/error.rs

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Relative profit is undefined for position amount {amount} at value {value}")]
    ZeroPositionValue { amount: Decimal, value: Decimal },
}

pub type Result<T> = std::result::Result<T, Error>;
