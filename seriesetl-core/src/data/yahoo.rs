//! Yahoo Finance price provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API for a trailing window and
//! returns them auto-adjusted: open/high/low are scaled by adjclose/close and
//! close is replaced by adjclose.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. Responses that no longer match are reported as
//! `ResponseFormatChanged`, never silently coerced.

use serde::Deserialize;
use tracing::debug;

use super::provider::{DataError, PriceProvider};
use crate::schema::PRICE_FIELDS;
use crate::table::{ColumnLabel, RawTable, RawValues};

/// Name of the date index Yahoo tables carry.
pub const INDEX_NAME: &str = "Date";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChartErrorBody {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        Ok(Self { client })
    }

    /// Build the chart API URL for a symbol and trailing window.
    fn chart_url(symbol: &str, lookback_days: u32) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?range={lookback_days}d&interval=1d&includeAdjustedClose=true"
        )
    }
}

/// Parse a chart API body into an auto-adjusted table labelled `(field, symbol)`.
///
/// Rows where every field is missing (holidays, halted days) are dropped.
/// A result without timestamps is an empty table.
pub fn parse_response(symbol: &str, body: &str) -> Result<RawTable, DataError> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
    })?;

    let result = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) if err.code == "Not Found" => {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
        (_, Some(err)) => {
            return Err(DataError::Provider(format!(
                "{}: {}",
                err.code, err.description
            )))
        }
        (Some(result), None) => result,
        (None, None) => {
            return Err(DataError::ResponseFormatChanged(
                "empty result with no error".into(),
            ))
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

    let Some(timestamps) = data.timestamp else {
        return Ok(RawTable::empty(symbol, INDEX_NAME));
    };

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut index = Vec::with_capacity(timestamps.len());
    let (mut close, mut high, mut low, mut open, mut volume) =
        (Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new());

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let o = at(&quote.open, i);
        let h = at(&quote.high, i);
        let l = at(&quote.low, i);
        let c = at(&quote.close, i);
        let v = quote.volume.get(i).copied().flatten();

        if o.is_none() && h.is_none() && l.is_none() && c.is_none() && v.is_none() {
            continue;
        }

        let adj = adj_closes.as_deref().and_then(|a| at(a, i));
        let ratio = match (adj, c) {
            (Some(adj), Some(c)) if c != 0.0 => Some(adj / c),
            _ => None,
        };
        let scale = |x: Option<f64>| match ratio {
            Some(r) => x.map(|x| x * r),
            None => x,
        };

        index.push(date);
        close.push(adj.or(c));
        high.push(scale(h));
        low.push(scale(l));
        open.push(scale(o));
        volume.push(v.and_then(|v| i64::try_from(v).ok()));
    }

    let values = [
        RawValues::Float(close),
        RawValues::Float(high),
        RawValues::Float(low),
        RawValues::Float(open),
        RawValues::Int(volume),
    ];
    let mut table = RawTable::new(symbol, INDEX_NAME, index);
    for (field, values) in PRICE_FIELDS.iter().zip(values) {
        table.push_column(ColumnLabel::hierarchical([*field, symbol]), values)?;
    }
    Ok(table)
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_history(&self, symbol: &str, lookback_days: u32) -> Result<RawTable, DataError> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidRequest("empty symbol".into()));
        }

        let url = Self::chart_url(symbol, lookback_days);
        debug!(%url, "fetching price history");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        // Yahoo answers unknown symbols with a 404 carrying a chart.error body.
        match parse_response(symbol, &body) {
            Err(DataError::ResponseFormatChanged(_)) if !status.is_success() => {
                Err(DataError::Http {
                    provider: self.name().to_string(),
                    status: status.as_u16(),
                })
            }
            other => other,
        }
    }
}
