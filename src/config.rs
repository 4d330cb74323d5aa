//! Configuration management for the `clima` application
//!
//! Every setting has a built-in default pointing at the public endpoints and
//! the São Carlos form defaults. A TOML file and `CLIMA__`-prefixed environment
//! variables can override them.

use crate::ClimaError;
use crate::models::date_range::{DEFAULT_LOOKBACK_DAYS, default_earliest_date};
use crate::models::location::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClimaConfig {
    /// NASA POWER endpoint settings
    #[serde(default)]
    pub power: PowerConfig,
    /// IP geolocation endpoint settings
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Form defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// NASA POWER daily point API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Daily point endpoint
    #[serde(default = "default_power_base_url")]
    pub base_url: String,
    /// POWER user community (`RE` = renewable energy)
    #[serde(default = "default_power_community")]
    pub community: String,
    /// Request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// IP geolocation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_geolocation_url")]
    pub url: String,
    /// Request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Minutes of inactivity after which a session is discarded
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Values the form starts with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Earliest selectable start date
    #[serde(default = "default_earliest_date")]
    pub earliest_date: NaiveDate,
    /// Default start date offset from today, in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u64,
}

// Default value functions
fn default_power_base_url() -> String {
    "https://power.larc.nasa.gov/api/temporal/daily/point".to_string()
}

fn default_power_community() -> String {
    "RE".to_string()
}

fn default_geolocation_url() -> String {
    "https://ipinfo.io/json".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8501
}

fn default_session_idle_minutes() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_latitude() -> f64 {
    DEFAULT_LATITUDE
}

fn default_longitude() -> f64 {
    DEFAULT_LONGITUDE
}

fn default_lookback_days() -> u64 {
    DEFAULT_LOOKBACK_DAYS
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            base_url: default_power_base_url(),
            community: default_power_community(),
            timeout_seconds: None,
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            url: default_geolocation_url(),
            timeout_seconds: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            session_idle_minutes: default_session_idle_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            earliest_date: default_earliest_date(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl ClimaConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // CLIMA__SERVER__PORT=9000 style overrides
        builder = builder.add_source(
            Environment::with_prefix("CLIMA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ClimaConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clima").join("config.toml"))
    }

    /// Replace empty strings and zeroes left by partial overrides
    pub fn apply_defaults(&mut self) {
        if self.power.base_url.is_empty() {
            self.power.base_url = default_power_base_url();
        }
        if self.power.community.is_empty() {
            self.power.community = default_power_community();
        }
        if self.geolocation.url.is_empty() {
            self.geolocation.url = default_geolocation_url();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.session_idle_minutes == 0 {
            self.server.session_idle_minutes = default_session_idle_minutes();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_urls()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        for (name, url) in [
            ("POWER base URL", &self.power.base_url),
            ("Geolocation URL", &self.geolocation.url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    ClimaError::config(format!("{name} must be a valid HTTP or HTTPS URL")).into(),
                );
            }
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        for timeout in [self.power.timeout_seconds, self.geolocation.timeout_seconds]
            .into_iter()
            .flatten()
        {
            if timeout == 0 || timeout > 300 {
                return Err(ClimaError::config(
                    "Request timeout must be between 1 and 300 seconds",
                )
                .into());
            }
        }

        if !(-90.0..=90.0).contains(&self.defaults.latitude) {
            return Err(ClimaError::config("Default latitude must be between -90 and 90").into());
        }

        if !(-180.0..=180.0).contains(&self.defaults.longitude) {
            return Err(
                ClimaError::config("Default longitude must be between -180 and 180").into(),
            );
        }

        if self.defaults.earliest_date > chrono::Local::now().date_naive() {
            return Err(ClimaError::config("Earliest date cannot be in the future").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ClimaError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ClimaError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.power.community.len() != 2 {
            return Err(ClimaError::config(
                "POWER community must be a two-letter code (AG, RE or SB)",
            )
            .into());
        }

        Ok(())
    }
}
