//! SeriesETL Chart - terminal rendering of chart specifications
//!
//! Renders the line and bar charts produced by the pipelines with ratatui,
//! into an off-screen buffer that is written out as plain text.

pub mod axis;
pub mod render;

pub use render::{buffer_lines, TerminalChartRenderer};
