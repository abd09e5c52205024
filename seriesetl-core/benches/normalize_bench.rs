//! Criterion benchmarks for the table hot paths.
//!
//! Benchmarks:
//! 1. Normalizing a multi-year weather table (projection, rounding, fill)
//! 2. Consolidating a symbol library
//! 3. Phase-2 re-parse of a gapped column

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use seriesetl_core::schema::{price_spec, weather_spec, DAILY_WEATHER_CODES};
use seriesetl_core::{normalize, ColumnLabel, NormalizedTable, RawTable, RawValues, SymbolLibrary};

// ── Helpers ──────────────────────────────────────────────────────────

fn dates(n: usize) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (0..n).map(|i| base + chrono::Duration::days(i as i64)).collect()
}

fn weather_raw(n: usize) -> RawTable {
    let mut raw = RawTable::new("bench", "time", dates(n));
    for (k, code) in DAILY_WEATHER_CODES.iter().enumerate() {
        let values = (0..n)
            .map(|i| (i % 17 != k).then(|| 10.0 + (i as f64 * 0.1 + k as f64).sin() * 8.123456))
            .collect();
        raw.push_column(ColumnLabel::flat(*code), RawValues::Float(values))
            .unwrap();
    }
    raw
}

fn price_table(symbol: &str, n: usize) -> NormalizedTable {
    let close = (0..n).map(|i| Some(100.0 + (i as f64 * 0.1).sin() * 10.0)).collect();
    let raw = RawTable::new(symbol, "Date", dates(n))
        .with_column(ColumnLabel::hierarchical(["Close", symbol]), RawValues::Float(close))
        .unwrap();
    normalize(raw, &price_spec()).unwrap()
}

// ── 1. Normalize ─────────────────────────────────────────────────────

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_weather");
    for days in [365usize, 1461, 3650] {
        let raw = weather_raw(days);
        let spec = weather_spec();
        group.bench_with_input(BenchmarkId::from_parameter(days), &raw, |b, raw| {
            b.iter(|| normalize(black_box(raw.clone()), &spec).unwrap())
        });
    }
    group.finish();
}

// ── 2. Consolidate ───────────────────────────────────────────────────

fn bench_consolidate(c: &mut Criterion) {
    let mut lib = SymbolLibrary::new();
    for symbol in ["AAPL", "TSLA", "MSFT", "GOOG", "AMZN"] {
        lib.insert(symbol, price_table(symbol, 250));
    }
    c.bench_function("consolidate_5x250", |b| {
        b.iter(|| black_box(&lib).consolidate("Name").unwrap())
    });
}

// ── 3. Re-parse ──────────────────────────────────────────────────────

fn bench_reparse(c: &mut Criterion) {
    let table = normalize(weather_raw(3650), &weather_spec()).unwrap();
    c.bench_function("reparse_gapped_column", |b| {
        b.iter(|| table.numeric_column(black_box("Temp_Promedio")).unwrap())
    });
}

criterion_group!(benches, bench_normalize, bench_consolidate, bench_reparse);
criterion_main!(benches);
