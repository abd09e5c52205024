//! Renders the charts built from a normalized weather table end to end.

use chrono::NaiveDate;
use seriesetl_chart::TerminalChartRenderer;
use seriesetl_core::chart::weather_charts;
use seriesetl_core::schema::weather_spec;
use seriesetl_core::{normalize, ChartRenderer, ColumnLabel, RawTable, RawValues};

#[test]
fn weather_table_renders_three_charts() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let index: Vec<NaiveDate> = (0..30).map(|i| start + chrono::Duration::days(i)).collect();
    let mut raw = RawTable::new("madrid", "time", index);
    for (k, code) in ["tavg", "tmin", "tmax", "prcp", "wspd"].iter().enumerate() {
        let values = (0..30)
            .map(|i| (i != 7).then(|| 5.0 + k as f64 + (i as f64 * 0.3).sin() * 4.0))
            .collect();
        raw.push_column(ColumnLabel::flat(*code), RawValues::Float(values))
            .unwrap();
    }
    let table = normalize(raw, &weather_spec()).unwrap();

    let mut renderer = TerminalChartRenderer::new(Vec::new()).with_size(90, 22);
    for chart in weather_charts(&table).unwrap() {
        renderer.render(&chart).unwrap();
    }
    let text = String::from_utf8(renderer.into_inner()).unwrap();

    assert!(text.contains("Temperatura Promedio Diaria"));
    assert!(text.contains("Temperaturas Extremas"));
    assert!(text.contains("Precipitación Diaria (mm)"));
    assert!(text.contains("2023-01-01"));
    assert!(text.contains("2023-01-30"));
}
