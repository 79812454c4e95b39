// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, DataSettings, OutputSettings, Settings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    load_settings_from("config", &environment)
}

/// Same layering as [`load_settings`], rooted at `dir` instead of `config/`.
pub fn load_settings_from(dir: &str, environment: &str) -> Result<Settings> {
    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::with_name(&format!("{dir}/base")))
        // 2. Load the environment-specific configuration file.
        .add_source(File::with_name(&format!("{dir}/{environment}")).required(false))
        // 3. Load settings from environment variables (e.g., `APP__SIMULATION__LEVERAGE=3`).
        // The prefix is `APP`, separator is `__`.
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    fn write(dir: &std::path::Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn base_file_is_layered_under_the_environment_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "base.toml",
            r#"
            [app]
            environment = "development"
            log_level = "info"

            [data]
            path = "data/ftx_BTC-PERP.csv"
            market = "BTC-PERP"

            [simulation]
            fee_rate = "0.0006"
            leverage = "1"
            initial_equity = "1000"
            "#,
        );
        write(
            dir.path(),
            "research.toml",
            r#"
            [simulation]
            leverage = "3"

            [strategy]
            slow_window = 120
            fast_window = 30
            "#,
        );

        let root = dir.path().to_str().unwrap();
        let settings = load_settings_from(root, "research").unwrap();

        assert_eq!(settings.simulation.leverage, dec!(3));
        assert_eq!(settings.simulation.fee_rate, dec!(0.0006));
        assert_eq!(settings.simulation.plot_distance, dec!(0.1));
        assert_eq!(settings.strategy.slow_window, 120);
        assert_eq!(settings.stop_loss.default_band, dec!(0.995));
        assert_eq!(settings.output.dir, std::path::PathBuf::from("output"));
        assert!(settings.data.from.is_none());
    }

    #[test]
    fn missing_base_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        assert!(matches!(load_settings_from(root, "development"), Err(Error::LoadError(_))));
    }
}
