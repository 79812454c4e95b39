// In crates/app-config/src/types.rs

use backtester::BacktestSettings;
use risk::StopLossSettings;
use serde::Deserialize;
use std::path::PathBuf;
use strategies::EwmaCrossSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Where the candles come from and which part of them is simulated.
    pub data: DataSettings,
    /// Spans of the two smoothed means.
    #[serde(default)]
    pub strategy: EwmaCrossSettings,
    #[serde(default)]
    pub simulation: BacktestSettings,
    #[serde(default)]
    pub stop_loss: StopLossSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DataSettings {
    /// The candle CSV file.
    pub path: PathBuf,
    /// Market label, e.g. "BTC-PERP".
    pub market: String,
    /// First bar to simulate (inclusive). Means are still warmed up on
    /// everything before it.
    #[serde(default)]
    pub from: Option<String>,
    /// Last bar to simulate (inclusive).
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OutputSettings {
    /// Directory for the exported equity curve, markers and summary.
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}
