//! SeriesETL Core: table model, normalizer, persistence sinks, providers.
//!
//! This crate contains the shared shape of both ETL pipelines:
//! - Raw provider tables and the immutable normalized table
//! - The normalizer (projection, renaming, rounding, name normalization)
//! - The two-phase missing-value policy (fill for storage, re-parse for computation)
//! - CSV and SQLite sinks with replace-write semantics
//! - Symbol library and consolidation for multi-symbol runs
//! - Chart specifications and the renderer capability
//! - Weather and price provider capabilities with HTTP implementations

pub mod chart;
pub mod data;
pub mod library;
pub mod missing;
pub mod normalize;
pub mod persist;
pub mod schema;
pub mod table;

pub use chart::{ChartError, ChartKind, ChartRenderer, ChartSeries, ChartSpec};
pub use data::{DataError, GeoPoint, PriceProvider, WeatherProvider};
pub use library::{ConsolidatedTable, SymbolLibrary};
pub use normalize::{normalize, ColumnMapping, NormalizeError, NormalizeSpec};
pub use persist::{CsvSink, PersistError, SqliteSink};
pub use table::{ColumnLabel, NormalizedTable, RawColumn, RawTable, RawValues, Tabular};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types handed between pipeline stages are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<RawTable>();
        require_sync::<RawTable>();
        require_send::<NormalizedTable>();
        require_sync::<NormalizedTable>();
        require_send::<SymbolLibrary>();
        require_sync::<SymbolLibrary>();
        require_send::<ConsolidatedTable>();
        require_sync::<ConsolidatedTable>();
        require_send::<ChartSpec>();
        require_sync::<ChartSpec>();
    }
}
