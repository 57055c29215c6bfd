use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Environment variable that overrides the configured weather API key.
pub const WEATHER_API_KEY_ENV: &str = "WEATHERPIN_WEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Initial map viewport
    #[serde(default)]
    pub map: MapConfig,

    /// Location tracking settings
    #[serde(default)]
    pub location: LocationConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// WeatherAPI.com API key. Overridden by WEATHERPIN_WEATHER_API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Weather API base URL
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

/// Initial viewport shown before the first position fix arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_latitude")]
    pub latitude: f64,
    #[serde(default = "default_map_longitude")]
    pub longitude: f64,
    /// Degrees of latitude/longitude visible around the center
    #[serde(default = "default_map_span")]
    pub span_degrees: f64,
}

fn default_map_latitude() -> f64 {
    40.0
}

fn default_map_longitude() -> f64 {
    -73.0
}

fn default_map_span() -> f64 {
    20.0
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            latitude: default_map_latitude(),
            longitude: default_map_longitude(),
            span_degrees: default_map_span(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Minimum movement in meters between position updates
    #[serde(default = "default_distance_interval")]
    pub distance_interval_m: u32,
}

fn default_distance_interval() -> u32 {
    100
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            distance_interval_m: default_distance_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Window width
    pub window_width: u32,

    /// Window height
    pub window_height: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: 1024,
            window_height: 768,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weatherpin");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            map: MapConfig::default(),
            location: LocationConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("weatherpin");
        Ok(config_dir.join("config.toml"))
    }

    /// The weather API key, with the environment variable taking precedence
    /// over the config file.
    pub fn weather_api_key(&self) -> Option<String> {
        std::env::var(WEATHER_API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.weather.api_key.clone())
    }

    /// Validate the configuration.
    ///
    /// A missing API key is a warning, not an error: the map and location
    /// tracking still work, only weather lookups will fail until it is set.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                format!("no API key configured; set it in config.toml or {WEATHER_API_KEY_ENV}"),
            );
        }

        if let Err(e) = Url::parse(&self.weather.base_url) {
            result.add_error("weather.base_url", format!("invalid URL: {e}"));
        }

        if !(-90.0..=90.0).contains(&self.map.latitude) {
            result.add_error("map.latitude", "must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.map.longitude) {
            result.add_error("map.longitude", "must be between -180 and 180");
        }
        if self.map.span_degrees <= 0.0 || self.map.span_degrees > 360.0 {
            result.add_error("map.span_degrees", "must be between 0 and 360");
        }

        if self.location.distance_interval_m == 0 {
            result.add_warning(
                "location.distance_interval_m",
                "a zero distance interval reports every sensor reading",
            );
        }

        result
    }
}
