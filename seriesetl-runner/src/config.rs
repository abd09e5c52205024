//! Serializable pipeline configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! reproduces the stock Madrid weather run and the AAPL/TSLA/MSFT price run.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use seriesetl_core::data::GeoPoint;
use seriesetl_core::schema::SYMBOL_COLUMN;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for both pipelines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub weather: WeatherConfig,
    pub stocks: StocksConfig,
}

impl PipelineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weather.validate()?;
        self.stocks.validate()
    }
}

/// Weather pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Directory the CSV is written to.
    pub output_dir: PathBuf,
    /// CSV file name inside `output_dir`.
    pub file_name: String,
    pub database: PathBuf,
    pub table: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            latitude: 40.4168,
            longitude: -3.7038,
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            output_dir: PathBuf::from("meteorologia"),
            file_name: "datos_meteorologicos.csv".into(),
            database: PathBuf::from("meteorologia.db"),
            table: "meteorologia".into(),
        }
    }
}

impl WeatherConfig {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ConfigError::Invalid(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ConfigError::Invalid(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        if self.start > self.end {
            return Err(ConfigError::Invalid(format!(
                "weather start {} is after end {}",
                self.start, self.end
            )));
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::Invalid("weather table name is empty".into()));
        }
        Ok(())
    }
}

/// Stock price pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StocksConfig {
    pub symbols: Vec<String>,
    pub lookback_days: u32,
    /// Directory holding one `<symbol>.csv` per symbol.
    pub csv_dir: PathBuf,
    pub database: PathBuf,
    pub table: String,
    /// Column naming each row's symbol in the consolidated table.
    pub symbol_column: String,
}

impl Default for StocksConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".into(), "TSLA".into(), "MSFT".into()],
            lookback_days: 30,
            csv_dir: PathBuf::from("data"),
            database: PathBuf::from("precios.db"),
            table: "precios".into(),
            symbol_column: SYMBOL_COLUMN.into(),
        }
    }
}

impl StocksConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_days == 0 {
            return Err(ConfigError::Invalid("lookback_days must be positive".into()));
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::Invalid("stocks table name is empty".into()));
        }
        if self.symbol_column.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol_column is empty".into()));
        }
        Ok(())
    }
}
