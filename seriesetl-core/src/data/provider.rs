//! Provider traits and structured error types.
//!
//! The weather and price providers abstract over upstream HTTP services so
//! the pipelines can swap implementations and run against mocks in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::{RawTable, TableError};

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Structured error types for fetch operations.
///
/// These are displayable as-is in CLI diagnostics.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("{provider} returned HTTP {status}")]
    Http { provider: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Daily weather observations for a point.
///
/// Implementations return a table indexed by date whose columns carry the
/// short codes listed in [`crate::schema::DAILY_WEATHER_CODES`].
pub trait WeatherProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily observations for `point` over `start..=end`.
    fn fetch_daily(
        &self,
        point: GeoPoint,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawTable, DataError>;
}

/// Daily price history for a ticker symbol.
///
/// Implementations label columns `(field, symbol)` with the fields in
/// [`crate::schema::PRICE_FIELDS`] order.
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the last `lookback_days` of daily bars for `symbol`.
    fn fetch_history(&self, symbol: &str, lookback_days: u32) -> Result<RawTable, DataError>;
}
