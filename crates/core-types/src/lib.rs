// In crates/core-types/src/lib.rs

pub mod error;
pub mod position;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use position::PositionState;
pub use types::{Bar, Candle, Marker, MarkerKind, Portfolio, Side, Symbol};
