//! Chart specifications and the renderer capability.
//!
//! Specifications are built from normalized tables through the phase-2
//! re-parse, so sentinel cells never reach a renderer; they are simply
//! absent points. Rendering itself lives behind [`ChartRenderer`].

use std::io;

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

use crate::library::SymbolLibrary;
use crate::table::NormalizedTable;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart output failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// One labelled series of dated values. Missing cells are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl ChartSeries {
    /// Pair `dates` with a re-parsed column, skipping rows where either is missing.
    pub fn from_column(
        label: impl Into<String>,
        dates: &[Option<NaiveDate>],
        values: &Float64Chunked,
    ) -> Self {
        let points = dates
            .iter()
            .zip(values.iter())
            .filter_map(|(date, value)| Some(((*date)?, value?)))
            .collect();
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A chart ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    /// Smallest and largest value across every series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, v)| v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// First and last date across every series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(d, _)| d))
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }
}

/// Something that can display a chart (a terminal, an image file, a test double).
pub trait ChartRenderer {
    fn render(&mut self, chart: &ChartSpec) -> Result<(), ChartError>;
}

/// The three weather charts: average temperature, min vs max, precipitation.
///
/// Charts whose columns are absent from the table are left out.
pub fn weather_charts(table: &NormalizedTable) -> Result<Vec<ChartSpec>, ChartError> {
    let dates = table.dates()?;
    let names = table.column_names();
    let has = |name: &str| names.iter().any(|n| n == name);
    let series = |name: &str, label: &str| -> Result<ChartSeries, ChartError> {
        Ok(ChartSeries::from_column(
            label,
            &dates,
            &table.numeric_column(name)?,
        ))
    };

    let mut charts = Vec::new();
    if has("Temp_Promedio") {
        charts.push(ChartSpec {
            title: "Temperatura Promedio Diaria".into(),
            x_label: "Fecha".into(),
            y_label: "°C".into(),
            kind: ChartKind::Line,
            series: vec![series("Temp_Promedio", "Temp. Promedio")?],
        });
    }
    if has("Temp_Minima") && has("Temp_Maxima") {
        charts.push(ChartSpec {
            title: "Temperaturas Extremas".into(),
            x_label: "Fecha".into(),
            y_label: "°C".into(),
            kind: ChartKind::Line,
            series: vec![
                series("Temp_Minima", "Mínima")?,
                series("Temp_Maxima", "Máxima")?,
            ],
        });
    }
    if has("Precipitacion_mm") {
        charts.push(ChartSpec {
            title: "Precipitación Diaria (mm)".into(),
            x_label: "Fecha".into(),
            y_label: "mm".into(),
            kind: ChartKind::Bar,
            series: vec![series("Precipitacion_mm", "Precipitación")?],
        });
    }
    Ok(charts)
}

/// Closing-price charts for a library, plus the symbols that had no close column.
#[derive(Debug, Clone, Default)]
pub struct ClosingCharts {
    pub charts: Vec<ChartSpec>,
    /// Symbol and its available columns, for each symbol without a `Close` column.
    pub missing: Vec<(String, Vec<String>)>,
}

/// One line chart per symbol from the first column whose name contains `Close`.
pub fn closing_price_charts(library: &SymbolLibrary) -> Result<ClosingCharts, ChartError> {
    let mut out = ClosingCharts::default();
    for (symbol, table) in library.iter() {
        let names = table.column_names();
        let Some(close) = names.iter().find(|n| n.contains("Close")) else {
            out.missing.push((symbol.to_string(), names));
            continue;
        };
        let dates = table.dates()?;
        out.charts.push(ChartSpec {
            title: format!("Precio de cierre {symbol}"),
            x_label: "Fecha".into(),
            y_label: "USD".into(),
            kind: ChartKind::Line,
            series: vec![ChartSeries::from_column(
                symbol,
                &dates,
                &table.numeric_column(close)?,
            )],
        });
    }
    Ok(out)
}
