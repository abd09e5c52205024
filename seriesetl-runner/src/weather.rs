//! Weather pipeline: fetch → normalize → CSV → SQLite → charts.

use std::path::PathBuf;

use tracing::info;

use seriesetl_core::chart::weather_charts;
use seriesetl_core::data::open_meteo::dataset_name;
use seriesetl_core::data::WeatherProvider;
use seriesetl_core::schema::weather_spec;
use seriesetl_core::{normalize, ChartRenderer, CsvSink, NormalizeError, NormalizedTable, SqliteSink};

use crate::config::WeatherConfig;
use crate::error::RunError;
use crate::progress::PipelineProgress;

/// What a completed weather run produced.
#[derive(Debug)]
pub struct WeatherOutcome {
    pub table: NormalizedTable,
    pub csv_path: PathBuf,
    pub rows_written: usize,
    pub charts_rendered: usize,
}

/// Run the weather pipeline once.
///
/// Returns `Ok(None)` without writing anything when the provider had no
/// observations for the range. Fetch and persistence failures propagate.
pub fn run_weather(
    provider: &dyn WeatherProvider,
    config: &WeatherConfig,
    progress: &dyn PipelineProgress,
    renderer: Option<&mut dyn ChartRenderer>,
) -> Result<Option<WeatherOutcome>, RunError> {
    let point = config.point();
    let dataset = dataset_name(point);
    progress.on_start(&dataset, 0, 1);

    let raw = provider.fetch_daily(point, config.start, config.end)?;
    let table = match normalize(raw, &weather_spec()) {
        Ok(table) => table,
        Err(NormalizeError::EmptyInput { dataset }) => {
            progress.on_empty(&dataset);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    progress.on_normalized(&dataset, table.height(), table.width());

    let csv_path = CsvSink::new(&config.output_dir).write_file(&config.file_name, &table)?;
    progress.on_csv_written(&csv_path);

    let db = SqliteSink::new(&config.database);
    let rows_written = db.replace_table(&config.table, &table)?;
    progress.on_table_replaced(db.path(), &config.table, rows_written);

    let mut charts_rendered = 0;
    if let Some(renderer) = renderer {
        for chart in weather_charts(&table)? {
            renderer.render(&chart)?;
            charts_rendered += 1;
        }
    }

    info!(
        provider = provider.name(),
        %dataset,
        rows = rows_written,
        charts = charts_rendered,
        "weather run complete"
    );
    Ok(Some(WeatherOutcome {
        table,
        csv_path,
        rows_written,
        charts_rendered,
    }))
}
