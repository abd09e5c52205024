//! Errors that end a pipeline run.

use polars::prelude::PolarsError;
use thiserror::Error;

use seriesetl_core::data::DataError;
use seriesetl_core::{ChartError, NormalizeError, PersistError};

/// Errors from the runner. Per-symbol failures in the stocks run are not
/// errors; they are recorded as skips in the report.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataError),

    #[error("normalize failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("persist failed: {0}")]
    Persist(#[from] PersistError),

    #[error("chart failed: {0}")]
    Chart(#[from] ChartError),

    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}
