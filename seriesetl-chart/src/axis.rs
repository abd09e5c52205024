//! Axis bounds and labels for chart specifications.

use chrono::NaiveDate;
use seriesetl_core::{ChartKind, ChartSpec};

/// X axis: days since `origin`, with first/middle/last date labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DateAxis {
    pub origin: NaiveDate,
    pub bounds: [f64; 2],
    pub labels: Vec<String>,
}

impl DateAxis {
    pub fn for_chart(chart: &ChartSpec) -> Option<Self> {
        let (first, last) = chart.date_range()?;
        let span = (last - first).num_days();
        let mid = first + chrono::Duration::days(span / 2);
        let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
        Some(Self {
            origin: first,
            bounds: [0.0, span.max(1) as f64],
            labels: vec![fmt(first), fmt(mid), fmt(last)],
        })
    }

    /// Position of `date` on this axis.
    pub fn x(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64
    }
}

/// Y bounds padded by 5% of the range. Bar charts always include zero.
pub fn value_bounds(chart: &ChartSpec) -> [f64; 2] {
    let Some((mut lo, mut hi)) = chart.value_range() else {
        return [0.0, 1.0];
    };
    if chart.kind == ChartKind::Bar {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let range = hi - lo;
    let pad = if range > 0.0 {
        range * 0.05
    } else {
        (lo.abs() * 0.05).max(1.0)
    };
    let lower = if chart.kind == ChartKind::Bar && lo >= 0.0 {
        0.0
    } else {
        lo - pad
    };
    [lower, hi + pad]
}

/// Lower, middle and upper labels for a value axis.
pub fn value_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| format!("{v:.1}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seriesetl_core::ChartSeries;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    fn spec(kind: ChartKind, points: Vec<(NaiveDate, f64)>) -> ChartSpec {
        ChartSpec {
            title: "t".into(),
            x_label: "Fecha".into(),
            y_label: "v".into(),
            kind,
            series: vec![ChartSeries {
                label: "s".into(),
                points,
            }],
        }
    }

    #[test]
    fn line_bounds_are_padded() {
        let chart = spec(ChartKind::Line, vec![(d(1), 10.0), (d(2), 20.0)]);
        let [lo, hi] = value_bounds(&chart);
        assert!((lo - 9.5).abs() < 1e-9);
        assert!((hi - 20.5).abs() < 1e-9);
    }

    #[test]
    fn bar_bounds_start_at_zero() {
        let chart = spec(ChartKind::Bar, vec![(d(1), 0.4), (d(2), 2.0)]);
        assert_eq!(value_bounds(&chart)[0], 0.0);
    }

    #[test]
    fn flat_series_still_gets_a_range() {
        let chart = spec(ChartKind::Line, vec![(d(1), 5.0), (d(2), 5.0)]);
        let [lo, hi] = value_bounds(&chart);
        assert!(lo < 5.0 && hi > 5.0);
        assert_eq!(value_bounds(&spec(ChartKind::Line, vec![])), [0.0, 1.0]);
    }

    #[test]
    fn date_axis_labels_first_mid_last() {
        let chart = spec(ChartKind::Line, vec![(d(1), 1.0), (d(11), 2.0)]);
        let axis = DateAxis::for_chart(&chart).unwrap();
        assert_eq!(axis.bounds, [0.0, 10.0]);
        assert_eq!(axis.labels, vec!["2023-01-01", "2023-01-06", "2023-01-11"]);
        assert_eq!(axis.x(d(4)), 3.0);
        assert!(DateAxis::for_chart(&spec(ChartKind::Line, vec![])).is_none());
    }

    proptest::proptest! {
        #[test]
        fn bounds_contain_every_value(
            values in proptest::collection::vec(-1.0e4..1.0e4_f64, 1..40),
            bar in proptest::bool::ANY,
        ) {
            let kind = if bar { ChartKind::Bar } else { ChartKind::Line };
            let points = values.iter().enumerate().map(|(i, &v)| (d(1) + chrono::Duration::days(i as i64), v)).collect();
            let [lo, hi] = value_bounds(&spec(kind, points));
            proptest::prop_assert!(lo < hi);
            for v in values {
                proptest::prop_assert!(lo <= v && v <= hi);
            }
        }
    }
}
