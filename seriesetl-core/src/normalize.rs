//! Normalizer: provider `RawTable` → storage-ready `NormalizedTable`.
//!
//! Steps, in order:
//! 1. Reject empty input (`EmptyInput`, a non-fatal skip for callers)
//! 2. Flatten hierarchical labels (`("Close", "AAPL")` → `Close_AAPL`)
//! 3. Project and rename through the static mapping, if one is given
//! 4. Round numeric values to [`ROUND_DECIMALS`]
//! 5. Fill missing cells with the sentinel (phase 1 of the missing-value policy)
//! 6. Materialize the date index as the leading column
//! 7. Normalize every column name to `[A-Za-z0-9_]+`

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::missing;
use crate::table::{date_to_days, NormalizedTable, RawTable, RawValues};

/// Decimal places kept for every numeric value.
pub const ROUND_DECIMALS: i32 = 3;

/// One entry of a static projection table: provider code → descriptive name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: String,
    pub target: String,
}

/// What the normalizer should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeSpec {
    /// Name of the materialized date column.
    pub index_column: String,
    /// Ordered projection; `None` keeps every column in provider order.
    pub projection: Option<Vec<ColumnMapping>>,
}

impl NormalizeSpec {
    pub fn keep_all(index_column: impl Into<String>) -> Self {
        Self {
            index_column: index_column.into(),
            projection: None,
        }
    }

    pub fn projected<I, S, T>(index_column: impl Into<String>, mapping: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            index_column: index_column.into(),
            projection: Some(
                mapping
                    .into_iter()
                    .map(|(source, target)| ColumnMapping {
                        source: source.into(),
                        target: target.into(),
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no data available for '{dataset}'")]
    EmptyInput { dataset: String },

    #[error("column '{column}' not present in '{dataset}'")]
    MissingColumn { dataset: String, column: String },

    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Normalize a raw table according to `spec`.
pub fn normalize(raw: RawTable, spec: &NormalizeSpec) -> Result<NormalizedTable, NormalizeError> {
    if raw.is_empty() {
        return Err(NormalizeError::EmptyInput {
            dataset: raw.dataset().to_string(),
        });
    }

    let (dataset, index, columns) = raw.into_parts();
    let flattened: Vec<(String, RawValues)> = columns
        .into_iter()
        .map(|c| (c.label.flatten(), c.values))
        .collect();
    let selected = project(&dataset, flattened, spec.projection.as_deref())?;

    let mut frame_columns = Vec::with_capacity(selected.len() + 1);
    let days: Vec<i32> = index.iter().map(|d| date_to_days(*d)).collect();
    frame_columns.push(
        Column::new(normalize_name(&spec.index_column, 0).into(), days).cast(&DataType::Date)?,
    );

    for (position, (name, values)) in selected.into_iter().enumerate() {
        let name = normalize_name(&name, position + 1);
        let rounded = rounded_column(&name, values);
        frame_columns.push(missing::fill_for_storage(&rounded)?);
    }

    let frame = DataFrame::new(frame_columns)?;
    debug!(
        dataset = %dataset,
        rows = frame.height(),
        columns = frame.width(),
        "normalized table"
    );
    Ok(NormalizedTable::new(dataset, frame))
}

/// Keep and rename the projected columns, or everything when no projection is set.
fn project(
    dataset: &str,
    columns: Vec<(String, RawValues)>,
    projection: Option<&[ColumnMapping]>,
) -> Result<Vec<(String, RawValues)>, NormalizeError> {
    let Some(mapping) = projection else {
        return Ok(columns);
    };

    let mut pool: Vec<Option<(String, RawValues)>> = columns.into_iter().map(Some).collect();
    let mut selected = Vec::with_capacity(mapping.len());
    for m in mapping {
        let taken = pool
            .iter_mut()
            .find(|slot| matches!(slot, Some((name, _)) if *name == m.source))
            .and_then(Option::take);
        match taken {
            Some((_, values)) => selected.push((m.target.clone(), values)),
            None => {
                return Err(NormalizeError::MissingColumn {
                    dataset: dataset.to_string(),
                    column: m.source.clone(),
                })
            }
        }
    }
    Ok(selected)
}

fn rounded_column(name: &str, values: RawValues) -> Column {
    match values {
        RawValues::Float(values) => {
            let rounded: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()).map(|x| round_to(x, ROUND_DECIMALS)))
                .collect();
            Column::new(name.into(), rounded)
        }
        RawValues::Int(values) => Column::new(name.into(), values),
    }
}

/// Round half away from zero to `decimals` places.
///
/// Values too large to scale are returned unchanged; they carry no
/// fractional digits at that magnitude anyway.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Turn a display name into an ASCII identifier.
///
/// Accented Latin letters are transliterated, spaces and hyphens become `_`,
/// any other character outside `[A-Za-z0-9_]` becomes `_`. An empty result
/// falls back to `column_<position>`.
pub fn normalize_name(name: &str, position: usize) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else if let Some(ascii) = transliterate(ch) {
            out.push(ascii);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        format!("column_{position}")
    } else {
        out
    }
}

fn transliterate(ch: char) -> Option<char> {
    let ascii = match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        _ => return None,
    };
    Some(ascii)
}
