//! Symbol library and consolidation for multi-symbol runs.
//!
//! The library maps each successfully processed symbol to its normalized
//! table, in insertion order. Consolidation stacks every entry into one
//! frame with a symbol-identifier column so row origin survives the concat.

use polars::prelude::*;
use tracing::debug;

use crate::normalize::normalize_name;
use crate::table::{NormalizedTable, Tabular};

/// Insertion-ordered mapping symbol → normalized table.
#[derive(Debug, Clone, Default)]
pub struct SymbolLibrary {
    entries: Vec<(String, NormalizedTable)>,
}

impl SymbolLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table. A symbol inserted twice keeps its position and takes the new table.
    pub fn insert(&mut self, symbol: impl Into<String>, table: NormalizedTable) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = table,
            None => self.entries.push((symbol, table)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&NormalizedTable> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, t)| t)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|(s, _)| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedTable)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stack every entry into one table with a `symbol_column` naming each row's origin.
    ///
    /// Column sets are unioned in first-seen order; cells a table does not have
    /// are null. A column numeric in every table stays numeric, otherwise it
    /// becomes text. Returns `None` for an empty library, and a `Duplicate`
    /// error when an entry already carries a column named `symbol_column`.
    pub fn consolidate(&self, symbol_column: &str) -> PolarsResult<Option<ConsolidatedTable>> {
        let symbol_column = normalize_name(symbol_column, 0);

        let mut layout: Vec<(String, DataType)> = Vec::new();
        for (symbol, table) in &self.entries {
            for column in table.frame().get_columns() {
                let name = column.name().as_str();
                if name == symbol_column {
                    return Err(PolarsError::Duplicate(
                        format!(
                            "table for '{symbol}' already has a '{symbol_column}' column; \
                             choose another symbol column"
                        )
                        .into(),
                    ));
                }
                match layout.iter_mut().find(|(n, _)| n == name) {
                    Some((_, dtype)) => *dtype = merge_dtype(dtype, column.dtype()),
                    None => layout.push((name.to_string(), column.dtype().clone())),
                }
            }
        }

        let mut stacked: Option<DataFrame> = None;
        for (symbol, table) in &self.entries {
            let height = table.height();
            let mut columns = Vec::with_capacity(layout.len() + 1);
            for (name, dtype) in &layout {
                let column = match table.frame().column(name) {
                    Ok(existing) => existing.cast(dtype)?,
                    Err(_) => Column::from(Series::full_null(name.as_str().into(), height, dtype)),
                };
                columns.push(column);
            }
            columns.push(Column::new(
                symbol_column.as_str().into(),
                vec![symbol.as_str(); height],
            ));
            let part = DataFrame::new(columns)?;

            match stacked.as_mut() {
                Some(frame) => {
                    frame.vstack_mut(&part)?;
                }
                None => stacked = Some(part),
            }
        }

        Ok(stacked.map(|frame| {
            debug!(
                symbols = self.entries.len(),
                rows = frame.height(),
                columns = frame.width(),
                "consolidated symbol library"
            );
            ConsolidatedTable {
                frame,
                symbol_column,
            }
        }))
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

fn merge_dtype(current: &DataType, next: &DataType) -> DataType {
    if current == next {
        current.clone()
    } else if is_numeric(current) && is_numeric(next) {
        DataType::Float64
    } else {
        DataType::String
    }
}

/// Every library entry stacked vertically, tagged with its symbol.
#[derive(Debug, Clone)]
pub struct ConsolidatedTable {
    frame: DataFrame,
    symbol_column: String,
}

impl ConsolidatedTable {
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn symbol_column(&self) -> &str {
        &self.symbol_column
    }

    /// Symbol of each row, in row order.
    pub fn row_symbols(&self) -> PolarsResult<Vec<String>> {
        Ok(self
            .frame
            .column(&self.symbol_column)?
            .str()?
            .iter()
            .map(|s| s.unwrap_or_default().to_string())
            .collect())
    }
}

impl Tabular for ConsolidatedTable {
    fn frame(&self) -> &DataFrame {
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, NormalizeSpec};
    use crate::table::{ColumnLabel, RawTable, RawValues};
    use chrono::NaiveDate;

    fn table(symbol: &str, closes: Vec<Option<f64>>) -> NormalizedTable {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let index = (0..closes.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let raw = RawTable::new(symbol, "Date", index)
            .with_column(
                ColumnLabel::hierarchical(["Close", "ALL"]),
                RawValues::Float(closes),
            )
            .unwrap();
        normalize(raw, &NormalizeSpec::keep_all("Fecha")).unwrap()
    }

    #[test]
    fn insert_keeps_order_and_replaces_duplicates() {
        let mut lib = SymbolLibrary::new();
        lib.insert("MSFT", table("MSFT", vec![Some(1.0)]));
        lib.insert("AAPL", table("AAPL", vec![Some(2.0)]));
        lib.insert("MSFT", table("MSFT", vec![Some(3.0), Some(4.0)]));

        assert_eq!(lib.symbols(), vec!["MSFT", "AAPL"]);
        assert_eq!(lib.get("MSFT").unwrap().height(), 2);
        assert!(!lib.contains("TSLA"));
    }

    #[test]
    fn consolidate_tags_rows_with_symbol() {
        let mut lib = SymbolLibrary::new();
        lib.insert("AAPL", table("AAPL", vec![Some(190.0), Some(191.5)]));
        lib.insert("MSFT", table("MSFT", vec![Some(410.25)]));

        let consolidated = lib.consolidate("Name").unwrap().unwrap();
        assert_eq!(consolidated.height(), 3);
        assert_eq!(
            consolidated.row_symbols().unwrap(),
            vec!["AAPL", "AAPL", "MSFT"]
        );
        let names: Vec<&str> = consolidated
            .frame()
            .get_column_names()
            .iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["Fecha", "Close_ALL", "Name"]);
    }

    #[test]
    fn consolidate_mixes_text_and_numeric_as_text() {
        let mut lib = SymbolLibrary::new();
        lib.insert("AAPL", table("AAPL", vec![Some(190.0)]));
        lib.insert("TSLA", table("TSLA", vec![Some(250.0), None]));

        let consolidated = lib.consolidate("Name").unwrap().unwrap();
        let close = consolidated.frame().column("Close_ALL").unwrap();
        assert_eq!(close.dtype(), &DataType::String);
        assert_eq!(consolidated.height(), 3);
    }

    #[test]
    fn consolidate_unions_differing_columns() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let make = |symbol: &str| {
            let raw = RawTable::new(symbol, "Date", vec![start])
                .with_column(
                    ColumnLabel::hierarchical(["Close", symbol]),
                    RawValues::Float(vec![Some(10.0)]),
                )
                .unwrap();
            normalize(raw, &NormalizeSpec::keep_all("Fecha")).unwrap()
        };
        let mut lib = SymbolLibrary::new();
        lib.insert("AAPL", make("AAPL"));
        lib.insert("MSFT", make("MSFT"));

        let consolidated = lib.consolidate("Name").unwrap().unwrap();
        let frame = consolidated.frame();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.column("Close_AAPL").unwrap().null_count(), 1);
        assert_eq!(frame.column("Close_MSFT").unwrap().null_count(), 1);
    }

    #[test]
    fn empty_library_consolidates_to_none() {
        assert!(SymbolLibrary::new().consolidate("Name").unwrap().is_none());
    }

    #[test]
    fn consolidate_rejects_a_column_named_like_the_symbol_column() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let raw = RawTable::new("ODD", "Date", vec![start])
            .with_column(ColumnLabel::flat("Name"), RawValues::Float(vec![Some(1.0)]))
            .unwrap();
        let mut lib = SymbolLibrary::new();
        lib.insert("AAPL", table("AAPL", vec![Some(190.0)]));
        lib.insert("ODD", normalize(raw, &NormalizeSpec::keep_all("Fecha")).unwrap());

        let err = lib.consolidate("Name").unwrap_err();
        assert!(matches!(err, PolarsError::Duplicate(_)));
        assert!(err.to_string().contains("'ODD'"));

        assert_eq!(lib.consolidate("Symbol").unwrap().unwrap().height(), 2);
    }
}
