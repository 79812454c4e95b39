// In crates/analytics/src/lib.rs

pub mod accumulator;
pub mod engine;
pub mod error;
pub mod types;

pub use accumulator::PnlAccumulator;
pub use engine::AnalyticsEngine;
pub use error::{Error, Result};
pub use types::{EquityPoint, PnlChange, RunStatistics, SummaryReport};
