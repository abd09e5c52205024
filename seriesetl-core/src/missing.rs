//! Two-phase missing-value policy.
//!
//! Phase 1, [`fill_for_storage`]: every missing cell becomes the literal
//! [`SENTINEL`]. A column that had gaps is stored as text; a complete column
//! keeps its numeric type.
//!
//! Phase 2, [`reparse_for_computation`]: any consumer that needs arithmetic
//! (charting, statistics) turns a stored column back into floats, with the
//! sentinel and any other unparseable text mapped to null.

use polars::prelude::*;

/// Marker written in place of missing data.
pub const SENTINEL: &str = "N/A";

/// Phase 1: replace nulls with the sentinel.
pub fn fill_for_storage(column: &Column) -> PolarsResult<Column> {
    if column.null_count() == 0 {
        return Ok(column.clone());
    }
    let text = column.cast(&DataType::String)?;
    let filled: StringChunked = text
        .str()?
        .iter()
        .map(|cell| Some(cell.unwrap_or(SENTINEL)))
        .collect();
    Ok(Column::from(filled.with_name(column.name().clone()).into_series()))
}

/// Phase 2: parse a stored column back into floats.
pub fn reparse_for_computation(column: &Column) -> PolarsResult<Float64Chunked> {
    let name = column.name().clone();
    match column.dtype() {
        DataType::String => {
            let parsed: Float64Chunked = column
                .str()?
                .iter()
                .map(|cell| cell.and_then(parse_cell))
                .collect();
            Ok(parsed.with_name(name))
        }
        DataType::Float64
        | DataType::Float32
        | DataType::Int64
        | DataType::Int32
        | DataType::Int16
        | DataType::Int8
        | DataType::UInt64
        | DataType::UInt32
        | DataType::UInt16
        | DataType::UInt8 => {
            let cast = column.cast(&DataType::Float64)?;
            Ok(cast.f64()?.clone().with_name(name))
        }
        other => Err(PolarsError::InvalidOperation(
            format!("column '{name}' of type {other} is not numeric").into(),
        )),
    }
}

fn parse_cell(text: &str) -> Option<f64> {
    let text = text.trim();
    if text == SENTINEL {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| !v.is_nan())
}
