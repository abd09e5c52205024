//! CSV sink: one file per dataset under a configured directory.

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use super::cells::frame_cells;
use super::PersistError;
use crate::table::Tabular;

/// Writes tables under one directory, either by exact file name or as `<stem>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<file_name>`, taken as given.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// `<dir>/<stem>.csv`. Dots in `stem` (`BRK.B`) are kept.
    pub fn dataset_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.csv"))
    }

    /// Write `table` to `<dir>/<file_name>` exactly.
    pub fn write_file<T: Tabular + ?Sized>(
        &self,
        file_name: &str,
        table: &T,
    ) -> Result<PathBuf, PersistError> {
        self.write_to(self.file_path(file_name), table)
    }

    /// Write `table` to `<dir>/<stem>.csv`.
    pub fn write_dataset<T: Tabular + ?Sized>(
        &self,
        stem: &str,
        table: &T,
    ) -> Result<PathBuf, PersistError> {
        self.write_to(self.dataset_path(stem), table)
    }

    /// Write with a header row. Creates the directory if absent.
    fn write_to<T: Tabular + ?Sized>(&self, path: PathBuf, table: &T) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let frame = table.frame();
        let columns = frame_cells(frame)?;
        let csv_err = |source| PersistError::Csv {
            path: path.clone(),
            source,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        wtr.write_record(frame.get_column_names().iter().map(|n| n.as_str()))
            .map_err(csv_err)?;
        for row in 0..frame.height() {
            wtr.write_record(columns.iter().map(|cells| cells[row].csv_field()))
                .map_err(csv_err)?;
        }
        wtr.flush().map_err(|source| PersistError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), rows = frame.height(), "wrote CSV");
        Ok(path)
    }
}

/// Read a persisted CSV back into a frame.
///
/// Columns whose every non-empty field parses as a float come back as
/// `Float64`; everything else stays text. Empty fields are null.
pub fn read_csv(path: &Path) -> Result<DataFrame, PersistError> {
    let csv_err = |source| PersistError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        for (i, field) in record.iter().enumerate().take(headers.len()) {
            fields[i].push(field.to_string());
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(fields)
        .map(|(name, values)| text_or_float_column(name, values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn text_or_float_column(name: &str, values: Vec<String>) -> Column {
    let non_empty = || values.iter().filter(|v| !v.is_empty());
    let numeric =
        non_empty().next().is_some() && non_empty().all(|v| v.parse::<f64>().is_ok());
    if numeric {
        let parsed: Vec<Option<f64>> = values.iter().map(|v| v.parse::<f64>().ok()).collect();
        Column::new(name.into(), parsed)
    } else {
        let text: Vec<Option<&str>> = values
            .iter()
            .map(|v| (!v.is_empty()).then_some(v.as_str()))
            .collect();
        Column::new(name.into(), text)
    }
}
