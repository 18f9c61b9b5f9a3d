//! CLI-facing enums for dashboard options
//!
//! Thin `ValueEnum` wrappers so the library types stay free of clap.

use clap::ValueEnum;

use crate::views::{BackendKind, Layout, TimeSeriesStyle};

/// Rendering backend
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliBackend {
    /// Braille charts in the terminal
    Terminal,
    /// Plotly figures
    Plotly,
    /// Vega-Lite specs
    Vega,
}

impl std::fmt::Display for CliBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliBackend::Terminal => write!(f, "terminal"),
            CliBackend::Plotly => write!(f, "plotly"),
            CliBackend::Vega => write!(f, "vega"),
        }
    }
}

impl From<CliBackend> for BackendKind {
    fn from(cli: CliBackend) -> Self {
        match cli {
            CliBackend::Terminal => BackendKind::Terminal,
            CliBackend::Plotly => BackendKind::Plotly,
            CliBackend::Vega => BackendKind::Vega,
        }
    }
}

/// Panel arrangement
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliLayout {
    /// One panel per row
    Stacked,
    /// Two by two
    Grid,
}

impl std::fmt::Display for CliLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLayout::Stacked => write!(f, "stacked"),
            CliLayout::Grid => write!(f, "grid"),
        }
    }
}

impl From<CliLayout> for Layout {
    fn from(cli: CliLayout) -> Self {
        match cli {
            CliLayout::Stacked => Layout::Stacked,
            CliLayout::Grid => Layout::Grid,
        }
    }
}

/// Time-series mark style
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliTimeStyle {
    /// Line + markers for small series, scatter for large ones
    Auto,
    /// Always connect points
    Line,
    /// Markers only
    Scatter,
}

impl std::fmt::Display for CliTimeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliTimeStyle::Auto => write!(f, "auto"),
            CliTimeStyle::Line => write!(f, "line"),
            CliTimeStyle::Scatter => write!(f, "scatter"),
        }
    }
}

impl From<CliTimeStyle> for TimeSeriesStyle {
    fn from(cli: CliTimeStyle) -> Self {
        match cli {
            CliTimeStyle::Auto => TimeSeriesStyle::Auto,
            CliTimeStyle::Line => TimeSeriesStyle::LineMarkers,
            CliTimeStyle::Scatter => TimeSeriesStyle::Scatter,
        }
    }
}
