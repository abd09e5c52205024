//! Open-Meteo historical weather provider.
//!
//! Queries the archive API for daily aggregates and maps each variable onto
//! the daily short codes (`tavg`, `tmin`, ...). Units are converted so the
//! table matches the short-code contract: snowfall in mm, sunshine in minutes.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::provider::{DataError, GeoPoint, WeatherProvider};
use crate::table::{ColumnLabel, RawTable, RawValues};

/// Name of the date index Open-Meteo tables carry.
pub const INDEX_NAME: &str = "time";

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Open-Meteo daily variable, its short code and the factor to the code's unit.
const DAILY_VARIABLES: &[(&str, &str, f64)] = &[
    ("temperature_2m_mean", "tavg", 1.0),
    ("temperature_2m_min", "tmin", 1.0),
    ("temperature_2m_max", "tmax", 1.0),
    ("precipitation_sum", "prcp", 1.0),
    ("snowfall_sum", "snow", 10.0),
    ("wind_direction_10m_dominant", "wdir", 1.0),
    ("wind_speed_10m_mean", "wspd", 1.0),
    ("wind_gusts_10m_max", "wpgt", 1.0),
    ("sunshine_duration", "tsun", 1.0 / 60.0),
];

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    #[serde(flatten)]
    series: std::collections::HashMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Open-Meteo archive provider.
pub struct OpenMeteoProvider {
    client: reqwest::blocking::Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        Ok(Self { client })
    }

    fn archive_url(point: GeoPoint, start: NaiveDate, end: NaiveDate) -> String {
        let daily = DAILY_VARIABLES
            .iter()
            .map(|(name, _, _)| *name)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{ARCHIVE_URL}?latitude={}&longitude={}&start_date={}&end_date={}\
             &daily={daily}&timezone=UTC&wind_speed_unit=kmh",
            point.latitude,
            point.longitude,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        )
    }

    /// Fetch with an explicit "today", so the clamping is testable.
    pub fn fetch_daily_as_of(
        &self,
        point: GeoPoint,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<RawTable, DataError> {
        let dataset = dataset_name(point);
        let Some((start, end)) = clamp_range(start, end, today) else {
            debug!(%dataset, "requested range has no past days; skipping request");
            return Ok(RawTable::empty(dataset, INDEX_NAME));
        };

        let url = Self::archive_url(point, start, end);
        debug!(%url, "fetching daily weather");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(match provider_error(&body) {
                Some(reason) => DataError::Provider(reason),
                None => DataError::Http {
                    provider: self.name().to_string(),
                    status: status.as_u16(),
                },
            });
        }
        parse_response(&dataset, &body)
    }
}

impl WeatherProvider for OpenMeteoProvider {
    fn name(&self) -> &str {
        "open_meteo"
    }

    fn fetch_daily(
        &self,
        point: GeoPoint,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawTable, DataError> {
        self.fetch_daily_as_of(point, start, end, chrono::Local::now().date_naive())
    }
}

/// Dataset name for a point, e.g. `40.4168,-3.7038`.
pub fn dataset_name(point: GeoPoint) -> String {
    format!("{:.4},{:.4}", point.latitude, point.longitude)
}

/// Clamp `end` to `today`. `None` when nothing of the range lies in the past.
pub fn clamp_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let end = end.min(today);
    (start <= end).then_some((start, end))
}

fn provider_error(body: &str) -> Option<String> {
    let err: ErrorBody = serde_json::from_str(body).ok()?;
    err.error
        .then(|| err.reason.unwrap_or_else(|| "unspecified error".into()))
}

/// Parse an archive body into a table with one column per daily short code.
pub fn parse_response(dataset: &str, body: &str) -> Result<RawTable, DataError> {
    if let Some(reason) = provider_error(body) {
        return Err(DataError::Provider(reason));
    }

    let resp: ArchiveResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse archive response: {e}"))
    })?;
    let Some(mut daily) = resp.daily else {
        return Ok(RawTable::empty(dataset, INDEX_NAME));
    };

    let index = daily
        .time
        .iter()
        .map(|t| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .map_err(|_| DataError::ResponseFormatChanged(format!("invalid date: {t}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let rows = index.len();

    let mut table = RawTable::new(dataset, INDEX_NAME, index);
    for (variable, code, factor) in DAILY_VARIABLES {
        let values = match daily.series.remove(*variable) {
            Some(values) => values
                .into_iter()
                .map(|v| v.map(|v| v * factor))
                .collect(),
            None => vec![None; rows],
        };
        table.push_column(ColumnLabel::flat(*code), RawValues::Float(values))?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DAILY_WEATHER_CODES;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const BODY: &str = r#"{
        "latitude": 40.4,
        "longitude": -3.7,
        "daily_units": {"time": "iso8601"},
        "daily": {
            "time": ["2023-01-01", "2023-01-02"],
            "temperature_2m_mean": [8.04567, 9.1],
            "temperature_2m_min": [2.1, null],
            "temperature_2m_max": [14.0, 15.5],
            "precipitation_sum": [0.0, 1.2],
            "snowfall_sum": [0.5, 0.0],
            "wind_direction_10m_dominant": [270, 250],
            "wind_speed_10m_mean": [11.2, 9.8],
            "wind_gusts_10m_max": [30.1, 25.0],
            "sunshine_duration": [3600.0, 1800.0]
        }
    }"#;

    #[test]
    fn parse_maps_variables_to_short_codes() {
        let table = parse_response("madrid", BODY).unwrap();
        assert_eq!(table.index_name(), "time");
        assert_eq!(table.index(), &[d(2023, 1, 1), d(2023, 1, 2)]);

        let codes: Vec<String> = table.columns().iter().map(|c| c.label.flatten()).collect();
        assert_eq!(codes, DAILY_WEATHER_CODES);

        let snow = &table.columns()[4].values;
        assert_eq!(snow, &RawValues::Float(vec![Some(5.0), Some(0.0)]));
        let tsun = &table.columns()[8].values;
        assert_eq!(tsun, &RawValues::Float(vec![Some(60.0), Some(30.0)]));
        let tmin = &table.columns()[1].values;
        assert_eq!(tmin, &RawValues::Float(vec![Some(2.1), None]));
    }

    #[test]
    fn absent_variable_becomes_missing_column() {
        let body = r#"{"daily": {"time": ["2023-01-01"], "temperature_2m_mean": [7.0]}}"#;
        let table = parse_response("x", body).unwrap();
        assert_eq!(table.columns().len(), DAILY_WEATHER_CODES.len());
        assert_eq!(table.columns()[3].values, RawValues::Float(vec![None]));
    }

    #[test]
    fn error_payload_is_provider_error() {
        let body = r#"{"error": true, "reason": "Parameter 'start_date' is out of allowed range"}"#;
        assert!(matches!(
            parse_response("x", body),
            Err(DataError::Provider(reason)) if reason.contains("start_date")
        ));
    }

    #[test]
    fn future_range_is_skipped_without_request() {
        let today = d(2024, 6, 1);
        assert_eq!(clamp_range(d(2030, 1, 1), d(2030, 12, 31), today), None);
        assert_eq!(
            clamp_range(d(2024, 5, 1), d(2024, 12, 31), today),
            Some((d(2024, 5, 1), today))
        );

        let provider = OpenMeteoProvider::new().unwrap();
        let point = GeoPoint::new(40.4168, -3.7038);
        let table = provider
            .fetch_daily_as_of(point, d(2030, 1, 1), d(2030, 12, 31), today)
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.dataset(), "40.4168,-3.7038");
    }

    #[test]
    fn url_requests_every_variable() {
        let url = OpenMeteoProvider::archive_url(
            GeoPoint::new(40.4168, -3.7038),
            d(2020, 1, 1),
            d(2023, 12, 31),
        );
        assert!(url.starts_with(ARCHIVE_URL));
        assert!(url.contains("latitude=40.4168&longitude=-3.7038"));
        assert!(url.contains("start_date=2020-01-01&end_date=2023-12-31"));
        for (variable, _, _) in DAILY_VARIABLES {
            assert!(url.contains(variable));
        }
    }
}
