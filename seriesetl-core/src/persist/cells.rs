//! Frame → cell conversion shared by the CSV and SQLite sinks.

use chrono::NaiveDate;
use polars::prelude::*;
use rusqlite::types::Value;

use crate::table::days_to_date;

/// One persisted value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    /// Field as written to CSV. Nulls become empty fields.
    pub fn csv_field(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(v) => v.to_string(),
            Self::Real(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Value bound into an SQLite statement. Dates use the `TIMESTAMP` text form.
    pub fn sql_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Integer(v) => Value::Integer(*v),
            Self::Real(v) => Value::Real(*v),
            Self::Text(s) => Value::Text(s.clone()),
            Self::Date(d) => Value::Text(d.format("%Y-%m-%d 00:00:00").to_string()),
        }
    }
}

/// SQLite column type for a frame dtype.
pub fn sql_affinity(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Float64 | DataType::Float32 => "REAL",
        DataType::Int64
        | DataType::Int32
        | DataType::Int16
        | DataType::Int8
        | DataType::UInt64
        | DataType::UInt32
        | DataType::UInt16
        | DataType::UInt8
        | DataType::Boolean => "INTEGER",
        DataType::Date => "TIMESTAMP",
        _ => "TEXT",
    }
}

/// Cells of one column, in row order.
pub fn column_cells(column: &Column) -> PolarsResult<Vec<Cell>> {
    let cells = match column.dtype() {
        DataType::Float64 | DataType::Float32 => column
            .cast(&DataType::Float64)?
            .f64()?
            .iter()
            .map(|v| v.map_or(Cell::Null, Cell::Real))
            .collect(),
        DataType::Int64
        | DataType::Int32
        | DataType::Int16
        | DataType::Int8
        | DataType::UInt64
        | DataType::UInt32
        | DataType::UInt16
        | DataType::UInt8
        | DataType::Boolean => column
            .cast(&DataType::Int64)?
            .i64()?
            .iter()
            .map(|v| v.map_or(Cell::Null, Cell::Integer))
            .collect(),
        DataType::Date => column
            .cast(&DataType::Int32)?
            .i32()?
            .iter()
            .map(|v| v.and_then(days_to_date).map_or(Cell::Null, Cell::Date))
            .collect(),
        _ => column
            .cast(&DataType::String)?
            .str()?
            .iter()
            .map(|v| v.map_or(Cell::Null, |s| Cell::Text(s.to_string())))
            .collect(),
    };
    Ok(cells)
}

/// Cells of every column (column-major).
pub fn frame_cells(frame: &DataFrame) -> PolarsResult<Vec<Vec<Cell>>> {
    frame.get_columns().iter().map(column_cells).collect()
}
