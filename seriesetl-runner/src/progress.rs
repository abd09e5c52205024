//! Progress reporting for pipeline runs.

use std::path::Path;

/// Progress callback for pipeline runs.
///
/// Each stage reports here so a front end can show what happened, including
/// the non-fatal skips that never surface as errors.
pub trait PipelineProgress: Send {
    /// Called when starting to fetch a dataset (a point or a symbol).
    fn on_start(&self, dataset: &str, index: usize, total: usize);

    /// Called when a dataset was fetched and normalized.
    fn on_normalized(&self, dataset: &str, rows: usize, columns: usize);

    /// Called when a dataset is skipped because fetching or normalizing failed.
    fn on_skipped(&self, dataset: &str, reason: &str);

    /// Called when the provider returned no rows.
    fn on_empty(&self, dataset: &str);

    fn on_csv_written(&self, path: &Path);

    fn on_table_replaced(&self, database: &Path, table: &str, rows: usize);

    /// Called when a symbol has no closing-price column to chart.
    fn on_chart_skipped(&self, dataset: &str, available: &[String]);

    /// Called when every dataset of a batch has been attempted.
    fn on_batch_complete(&self, succeeded: usize, skipped: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl PipelineProgress for StdoutProgress {
    fn on_start(&self, dataset: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {dataset}...", index + 1, total);
    }

    fn on_normalized(&self, dataset: &str, rows: usize, columns: usize) {
        println!("  OK: {dataset} ({rows} rows, {columns} columns)");
    }

    fn on_skipped(&self, dataset: &str, reason: &str) {
        println!("  SKIP: {dataset}: {reason}");
    }

    fn on_empty(&self, dataset: &str) {
        println!("  No data available for {dataset}");
    }

    fn on_csv_written(&self, path: &Path) {
        println!("Saved {}", path.display());
    }

    fn on_table_replaced(&self, database: &Path, table: &str, rows: usize) {
        println!("Stored {rows} rows in {}:{table}", database.display());
    }

    fn on_chart_skipped(&self, dataset: &str, available: &[String]) {
        println!(
            "  No closing-price column for {dataset}; columns: {}",
            available.join(", ")
        );
    }

    fn on_batch_complete(&self, succeeded: usize, skipped: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {skipped} skipped");
    }
}

/// Progress reporter that discards everything.
pub struct SilentProgress;

impl PipelineProgress for SilentProgress {
    fn on_start(&self, _dataset: &str, _index: usize, _total: usize) {}
    fn on_normalized(&self, _dataset: &str, _rows: usize, _columns: usize) {}
    fn on_skipped(&self, _dataset: &str, _reason: &str) {}
    fn on_empty(&self, _dataset: &str) {}
    fn on_csv_written(&self, _path: &Path) {}
    fn on_table_replaced(&self, _database: &Path, _table: &str, _rows: usize) {}
    fn on_chart_skipped(&self, _dataset: &str, _available: &[String]) {}
    fn on_batch_complete(&self, _succeeded: usize, _skipped: usize, _total: usize) {}
}
