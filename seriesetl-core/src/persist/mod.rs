//! Persistence sinks.
//!
//! - **CSV**: one file per dataset under an output directory
//! - **SQLite**: replace-write of a single named table inside one database file
//!
//! Both sinks only read the table they are given. Failures propagate to the
//! caller unrecovered; there is no retry.

pub mod cells;
pub mod csv_sink;
pub mod sqlite;

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use csv_sink::{read_csv, CsvSink};
pub use sqlite::SqliteSink;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error at {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}
