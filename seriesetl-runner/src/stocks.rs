//! Stocks pipeline: per-symbol fetch and normalize, then CSV per symbol,
//! one consolidated SQLite table and closing-price charts.
//!
//! A symbol that fails to fetch or comes back empty is skipped with a
//! diagnostic and the run continues. Persistence failures end the run.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use seriesetl_core::chart::closing_price_charts;
use seriesetl_core::data::{DataError, PriceProvider};
use seriesetl_core::schema::price_spec;
use seriesetl_core::{normalize, ChartRenderer, CsvSink, NormalizeError, SqliteSink, SymbolLibrary};

use crate::config::StocksConfig;
use crate::error::RunError;
use crate::progress::PipelineProgress;

/// Why a symbol did not make it into the library.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("{0}")]
    Fetch(#[from] DataError),

    #[error("no data available")]
    Empty,

    #[error("{0}")]
    Normalize(NormalizeError),
}

#[derive(Debug)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Outcome of a stocks run: what succeeded, what was skipped, what was written.
#[derive(Debug, Default)]
pub struct StocksReport {
    pub library: SymbolLibrary,
    pub skipped: Vec<SkippedSymbol>,
    pub csv_paths: Vec<PathBuf>,
    /// Rows in the consolidated table; `None` when nothing was persisted.
    pub rows_written: Option<usize>,
    /// Symbols without a closing-price column, with the columns they do have.
    pub missing_close: Vec<(String, Vec<String>)>,
    pub charts_rendered: usize,
}

impl StocksReport {
    pub fn succeeded(&self) -> Vec<&str> {
        self.library.symbols()
    }

    pub fn skipped_symbols(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.symbol.as_str()).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Fetch and normalize every symbol in order. Failures are recorded, not raised.
pub fn build_library(
    provider: &dyn PriceProvider,
    symbols: &[String],
    lookback_days: u32,
    progress: &dyn PipelineProgress,
) -> (SymbolLibrary, Vec<SkippedSymbol>) {
    let total = symbols.len();
    let mut library = SymbolLibrary::new();
    let mut skipped = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        let outcome = provider
            .fetch_history(symbol, lookback_days)
            .map_err(SkipReason::from)
            .and_then(|raw| {
                normalize(raw, &price_spec()).map_err(|e| match e {
                    NormalizeError::EmptyInput { .. } => SkipReason::Empty,
                    other => SkipReason::Normalize(other),
                })
            });

        match outcome {
            Ok(table) => {
                progress.on_normalized(symbol, table.height(), table.width());
                library.insert(symbol.as_str(), table);
            }
            Err(reason) => {
                warn!(%symbol, %reason, "skipping symbol");
                match &reason {
                    SkipReason::Empty => progress.on_empty(symbol),
                    other => progress.on_skipped(symbol, &other.to_string()),
                }
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    progress.on_batch_complete(library.len(), skipped.len(), total);
    (library, skipped)
}

/// Run the stocks pipeline once.
///
/// When no symbol succeeds nothing is written and `rows_written` is `None`.
pub fn run_stocks(
    provider: &dyn PriceProvider,
    config: &StocksConfig,
    progress: &dyn PipelineProgress,
    renderer: Option<&mut dyn ChartRenderer>,
) -> Result<StocksReport, RunError> {
    let (library, skipped) =
        build_library(provider, &config.symbols, config.lookback_days, progress);
    let mut report = StocksReport {
        library,
        skipped,
        ..StocksReport::default()
    };

    let Some(consolidated) = report.library.consolidate(&config.symbol_column)? else {
        info!(provider = provider.name(), "no symbol succeeded; nothing persisted");
        return Ok(report);
    };

    let csv = CsvSink::new(&config.csv_dir);
    for (symbol, table) in report.library.iter() {
        let path = csv.write_dataset(symbol, table)?;
        progress.on_csv_written(&path);
        report.csv_paths.push(path);
    }

    let db = SqliteSink::new(&config.database);
    let rows = db.replace_table(&config.table, &consolidated)?;
    progress.on_table_replaced(db.path(), &config.table, rows);
    report.rows_written = Some(rows);

    let closing = closing_price_charts(&report.library)?;
    for (symbol, columns) in &closing.missing {
        progress.on_chart_skipped(symbol, columns);
    }
    if let Some(renderer) = renderer {
        for chart in &closing.charts {
            renderer.render(chart)?;
            report.charts_rendered += 1;
        }
    }
    report.missing_close = closing.missing;

    info!(
        provider = provider.name(),
        succeeded = report.library.len(),
        skipped = report.skipped.len(),
        rows,
        "stocks run complete"
    );
    Ok(report)
}
