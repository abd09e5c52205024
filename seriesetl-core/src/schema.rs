//! Output schema contract shared by both pipelines.
//!
//! Defines the materialized date column, the weather short-code table, the
//! symbol-identifier column of the consolidated price table, and the
//! provider column codes the normalizer projects from.

use crate::normalize::NormalizeSpec;

/// Name of the materialized date column in every persisted table.
pub const INDEX_COLUMN: &str = "Fecha";

/// Column added to each row of the consolidated price table.
pub const SYMBOL_COLUMN: &str = "Name";

/// Daily weather short codes delivered by weather providers.
///
/// - tavg/tmin/tmax: air temperature (°C)
/// - prcp: precipitation (mm)
/// - snow: snowfall (mm)
/// - wdir: dominant wind direction (°)
/// - wspd: mean wind speed (km/h)
/// - wpgt: peak wind gust (km/h)
/// - tsun: sunshine duration (minutes)
pub const DAILY_WEATHER_CODES: &[&str] = &[
    "tavg", "tmin", "tmax", "prcp", "snow", "wdir", "wspd", "wpgt", "tsun",
];

/// Weather short code → descriptive column name, in output order.
pub const WEATHER_COLUMNS: &[(&str, &str)] = &[
    ("tavg", "Temp_Promedio"),
    ("tmin", "Temp_Minima"),
    ("tmax", "Temp_Maxima"),
    ("prcp", "Precipitacion_mm"),
    ("wspd", "Viento_kmh"),
];

/// Price levels delivered by price providers, in provider column order.
pub const PRICE_FIELDS: &[&str] = &["Close", "High", "Low", "Open", "Volume"];

/// Normalization for the weather pipeline: project and rename the short codes.
pub fn weather_spec() -> NormalizeSpec {
    NormalizeSpec::projected(INDEX_COLUMN, WEATHER_COLUMNS.iter().copied())
}

/// Normalization for the price pipeline: keep every (flattened) column.
pub fn price_spec() -> NormalizeSpec {
    NormalizeSpec::keep_all(INDEX_COLUMN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_name;

    #[test]
    fn weather_columns_are_already_normalized() {
        for (_, name) in WEATHER_COLUMNS {
            assert_eq!(normalize_name(name, 0), *name);
        }
    }

    #[test]
    fn weather_mapping_is_one_to_one() {
        for (i, (code, name)) in WEATHER_COLUMNS.iter().enumerate() {
            assert!(DAILY_WEATHER_CODES.contains(code));
            for (other_code, other_name) in &WEATHER_COLUMNS[i + 1..] {
                assert_ne!(code, other_code);
                assert_ne!(name, other_name);
            }
        }
    }

    #[test]
    fn weather_spec_projects_in_order() {
        let spec = weather_spec();
        assert_eq!(spec.index_column, "Fecha");
        let targets: Vec<&str> = spec
            .projection
            .as_ref()
            .unwrap()
            .iter()
            .map(|m| m.target.as_str())
            .collect();
        assert_eq!(
            targets,
            vec![
                "Temp_Promedio",
                "Temp_Minima",
                "Temp_Maxima",
                "Precipitacion_mm",
                "Viento_kmh"
            ]
        );
    }
}
