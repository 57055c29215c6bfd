pub mod config;
pub mod error;
pub mod state;

pub use config::{Config, LocationConfig, MapConfig, UiConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, LocationError, NetworkError, WeatherError};
pub use state::{AppState, ErrorBanner, PopupState, Viewport};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("WeatherPin core initialized");
    Ok(())
}
