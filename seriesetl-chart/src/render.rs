//! Terminal chart renderer.
//!
//! Draws a [`ChartSpec`] with ratatui's `Chart` widget into an off-screen
//! buffer, then writes the buffer row by row as plain text. Any `io::Write`
//! works as the sink: stdout in the CLI, a `Vec<u8>` in tests.

use std::io::Write;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};
use seriesetl_core::{ChartError, ChartKind, ChartRenderer, ChartSpec};

use crate::axis::{value_bounds, value_labels, DateAxis};

const PALETTE: [Color; 5] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Red,
];

/// Renders charts as text into `out`.
pub struct TerminalChartRenderer<W: Write> {
    out: W,
    width: u16,
    height: u16,
}

impl<W: Write> TerminalChartRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: 100,
            height: 24,
        }
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width.max(20);
        self.height = height.max(8);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Draw `chart` into a fresh buffer of the configured size.
    pub fn draw(&self, chart: &ChartSpec) -> Buffer {
        let area = Rect::new(0, 0, self.width, self.height);
        let mut buf = Buffer::empty(area);

        let x_axis = DateAxis::for_chart(chart);
        let y_bounds = value_bounds(chart);

        let series_data: Vec<Vec<(f64, f64)>> = chart
            .series
            .iter()
            .map(|s| match &x_axis {
                Some(axis) => s.points.iter().map(|&(d, v)| (axis.x(d), v)).collect(),
                None => Vec::new(),
            })
            .collect();

        let (graph_type, marker) = match chart.kind {
            ChartKind::Line => (GraphType::Line, symbols::Marker::Braille),
            ChartKind::Bar => (GraphType::Bar, symbols::Marker::HalfBlock),
        };

        let datasets: Vec<Dataset> = chart
            .series
            .iter()
            .zip(&series_data)
            .enumerate()
            .map(|(i, (series, data))| {
                Dataset::default()
                    .name(series.label.clone())
                    .marker(marker)
                    .graph_type(graph_type)
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    .data(data)
            })
            .collect();

        let (x_bounds, x_labels) = match &x_axis {
            Some(axis) => (axis.bounds, axis.labels.clone()),
            None => ([0.0, 1.0], vec!["sin datos".to_string()]),
        };

        let title = format!(" {} ", chart.title);
        Chart::new(datasets)
            .block(
                Block::default()
                    .title(Span::styled(
                        title,
                        Style::default().add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL),
            )
            .x_axis(
                Axis::default()
                    .title(chart.x_label.as_str())
                    .bounds(x_bounds)
                    .labels(x_labels.into_iter().map(Span::raw).collect::<Vec<_>>()),
            )
            .y_axis(
                Axis::default()
                    .title(chart.y_label.as_str())
                    .bounds(y_bounds)
                    .labels(
                        value_labels(y_bounds)
                            .into_iter()
                            .map(Span::raw)
                            .collect::<Vec<_>>(),
                    ),
            )
            .render(area, &mut buf);

        buf
    }
}

impl<W: Write> ChartRenderer for TerminalChartRenderer<W> {
    fn render(&mut self, chart: &ChartSpec) -> Result<(), ChartError> {
        let buf = self.draw(chart);
        for line in buffer_lines(&buf) {
            writeln!(self.out, "{}", line.trim_end())?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Rows of a buffer as plain text, styles dropped.
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()))
                .collect()
        })
        .collect()
}
