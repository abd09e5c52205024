//! SeriesETL Runner: pipeline orchestration.
//!
//! This crate builds on `seriesetl-core` to provide:
//! - TOML configuration with defaults for both pipelines
//! - Progress reporting (stdout or silent)
//! - The weather run: one point, one date range, one table
//! - The stocks run: many symbols, per-symbol skips, one consolidated table

pub mod config;
pub mod error;
pub mod progress;
pub mod stocks;
pub mod weather;

pub use config::{ConfigError, PipelineConfig, StocksConfig, WeatherConfig};
pub use error::RunError;
pub use progress::{PipelineProgress, SilentProgress, StdoutProgress};
pub use stocks::{build_library, run_stocks, SkipReason, SkippedSymbol, StocksReport};
pub use weather::{run_weather, WeatherOutcome};
