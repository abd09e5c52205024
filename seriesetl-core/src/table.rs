//! Raw provider tables and the normalized, storage-ready table.
//!
//! A `RawTable` is what a provider hands back: a date index plus labelled
//! columns of optional numbers. A `NormalizedTable` wraps a Polars
//! `DataFrame` and can only be produced by the normalizer; it exposes
//! read-only accessors so persistence and charting never mutate it.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use thiserror::Error;

use crate::missing;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a date to Polars' physical `Date` representation (days since epoch).
pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`date_to_days`].
pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// A column label as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLabel {
    /// Single-level label, e.g. `tavg`.
    Flat(String),
    /// Multi-level label, outermost level first, e.g. `["Close", "AAPL"]`.
    Hierarchical(Vec<String>),
}

impl ColumnLabel {
    pub fn flat(name: impl Into<String>) -> Self {
        Self::Flat(name.into())
    }

    pub fn hierarchical<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Hierarchical(levels.into_iter().map(Into::into).collect())
    }

    /// Collapse the label into a single name, joining levels with `_`.
    pub fn flatten(&self) -> String {
        match self {
            Self::Flat(name) => name.trim().to_string(),
            Self::Hierarchical(levels) => levels.join("_").trim().to_string(),
        }
    }
}

/// Column values before normalization. `None` (and NaN) mark missing cells.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValues {
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
}

impl RawValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub label: ColumnLabel,
    pub values: RawValues,
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{column}' has {actual} values, index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Observations returned by a single fetch, indexed by date.
#[derive(Debug, Clone)]
pub struct RawTable {
    dataset: String,
    index_name: String,
    index: Vec<NaiveDate>,
    columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(
        dataset: impl Into<String>,
        index_name: impl Into<String>,
        index: Vec<NaiveDate>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            index_name: index_name.into(),
            index,
            columns: Vec::new(),
        }
    }

    /// A table with no rows, as returned for a range with no observations.
    pub fn empty(dataset: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self::new(dataset, index_name, Vec::new())
    }

    /// Append a column. Its length must match the index.
    pub fn push_column(&mut self, label: ColumnLabel, values: RawValues) -> Result<(), TableError> {
        if values.len() != self.index.len() {
            return Err(TableError::LengthMismatch {
                column: label.flatten(),
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        self.columns.push(RawColumn { label, values });
        Ok(())
    }

    /// Builder form of [`RawTable::push_column`].
    pub fn with_column(mut self, label: ColumnLabel, values: RawValues) -> Result<Self, TableError> {
        self.push_column(label, values)?;
        Ok(self)
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<NaiveDate>, Vec<RawColumn>) {
        (self.dataset, self.index, self.columns)
    }
}

/// Anything the sinks can persist.
pub trait Tabular {
    fn frame(&self) -> &DataFrame;
}

impl Tabular for DataFrame {
    fn frame(&self) -> &DataFrame {
        self
    }
}

/// Storage-ready table: leading date column, ASCII column names, values
/// rounded to 3 decimals, missing cells stored as the `"N/A"` sentinel.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    dataset: String,
    frame: DataFrame,
}

impl NormalizedTable {
    pub(crate) fn new(dataset: String, frame: DataFrame) -> Self {
        Self { dataset, frame }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Name of the leading date column.
    pub fn index_column(&self) -> Option<&str> {
        self.frame.get_columns().first().map(|c| c.name().as_str())
    }

    /// Dates of the leading column, in row order.
    pub fn dates(&self) -> PolarsResult<Vec<Option<NaiveDate>>> {
        let index = self
            .frame
            .get_columns()
            .first()
            .ok_or_else(|| PolarsError::NoData("table has no columns".into()))?;
        let days = index.cast(&DataType::Int32)?;
        Ok(days
            .i32()?
            .iter()
            .map(|d| d.and_then(days_to_date))
            .collect())
    }

    /// A column re-parsed for arithmetic: sentinel cells come back as nulls.
    pub fn numeric_column(&self, name: &str) -> PolarsResult<Float64Chunked> {
        missing::reparse_for_computation(self.frame.column(name)?)
    }
}

impl Tabular for NormalizedTable {
    fn frame(&self) -> &DataFrame {
        &self.frame
    }
}
