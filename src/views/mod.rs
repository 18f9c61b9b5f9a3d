//! Presentation stage - backend-neutral chart descriptions
//!
//! Each view is a pure function from a filtered table to a [`Chart`]. Backends
//! ([`plotly`], [`vega`], and the terminal renderer in `cli::viz`) turn charts
//! into something drawable.

pub mod plotly;
pub mod vega;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::aggregate::{failure_rate_by_equipment, mean_by_equipment, GroupFailureRate, GroupMean};
use crate::core::filter::{FilteredView, Selection};

pub use plotly::PlotlyBackend;
pub use vega::VegaLiteBackend;

/// Largest per-equipment series still drawn as connected line + markers
pub const LINE_MAX_POINTS: usize = 60;

/// The four dashboard panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Distribution,
    Mean,
    FailureRate,
    TimeSeries,
}

impl ViewKind {
    pub fn all() -> [ViewKind; 4] {
        [
            ViewKind::Distribution,
            ViewKind::Mean,
            ViewKind::FailureRate,
            ViewKind::TimeSeries,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Distribution => "Per-equipment boxplot",
            ViewKind::Mean => "Per-equipment mean",
            ViewKind::FailureRate => "Per-equipment failure rate",
            ViewKind::TimeSeries => "Per-equipment time series",
        }
    }

    /// Stable id used for HTML elements
    pub fn slug(&self) -> &'static str {
        match self {
            ViewKind::Distribution => "distribution",
            ViewKind::Mean => "mean",
            ViewKind::FailureRate => "failure-rate",
            ViewKind::TimeSeries => "time-series",
        }
    }
}

/// Panel arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One panel per row
    Stacked,
    /// 2x2 grid
    #[default]
    Grid,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Stacked => write!(f, "stacked"),
            Layout::Grid => write!(f, "grid"),
        }
    }
}

/// Where the dashboard is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Braille charts on stdout
    #[default]
    Terminal,
    /// Plotly figure JSON / HTML page
    Plotly,
    /// Vega-Lite spec JSON / HTML page
    Vega,
}

impl BackendKind {
    /// JSON backend, `None` for the terminal renderer
    pub fn chart_backend(&self) -> Option<Box<dyn ChartBackend>> {
        match self {
            BackendKind::Terminal => None,
            BackendKind::Plotly => Some(Box::new(PlotlyBackend)),
            BackendKind::Vega => Some(Box::new(VegaLiteBackend)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Terminal => write!(f, "terminal"),
            BackendKind::Plotly => write!(f, "plotly"),
            BackendKind::Vega => write!(f, "vega"),
        }
    }
}

/// How the time-series view draws its marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSeriesStyle {
    /// Line + markers for sparse data, scatter otherwise
    #[default]
    Auto,
    LineMarkers,
    Scatter,
}

impl TimeSeriesStyle {
    /// Resolve `Auto` against the largest series size
    pub fn resolve(self, largest_series: usize) -> TimeSeriesStyle {
        match self {
            TimeSeriesStyle::Auto if largest_series <= LINE_MAX_POINTS => {
                TimeSeriesStyle::LineMarkers
            }
            TimeSeriesStyle::Auto => TimeSeriesStyle::Scatter,
            other => other,
        }
    }
}

/// Five-number summary of a box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    /// Quartiles by linear interpolation between order statistics
    pub fn from_values(values: &[f64]) -> Option<BoxStats> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let quantile = |p: f64| {
            let pos = p * (sorted.len() - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        };

        Some(BoxStats {
            min: sorted[0],
            q1: quantile(0.25),
            median: quantile(0.5),
            q3: quantile(0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// One box of the distribution view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub equipment_id: String,
    pub values: Vec<f64>,
    pub stats: BoxStats,
}

/// One bar of a bar view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub equipment_id: String,
    pub value: f64,
}

/// One mark of the time-series view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    /// Position in the equipment-filtered view (what a selection reports)
    pub position: usize,
    pub row: usize,
    pub timestamp: NaiveDateTime,
    pub measurement: f64,
    pub lot_id: String,
    pub wafer_id: String,
    pub selected: bool,
}

/// All marks of one equipment id, ordered by timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub equipment_id: String,
    pub points: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Boxes { groups: Vec<BoxGroup> },
    Bars { bars: Vec<Bar> },
    Series { style: TimeSeriesStyle, series: Vec<Series> },
}

/// A chart description handed to a backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ViewKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Fixed y-axis range, if any
    pub y_range: Option<[f64; 2]>,
    pub body: ChartBody,
}

impl Chart {
    /// Equipment ids that have marks in this chart
    pub fn equipment_ids(&self) -> Vec<&str> {
        match &self.body {
            ChartBody::Boxes { groups } => groups.iter().map(|g| g.equipment_id.as_str()).collect(),
            ChartBody::Bars { bars } => bars.iter().map(|b| b.equipment_id.as_str()).collect(),
            ChartBody::Series { series, .. } => {
                series.iter().map(|s| s.equipment_id.as_str()).collect()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.equipment_ids().is_empty()
    }
}

/// Distribution view: one box with all points per equipment
pub fn distribution_chart(view: &FilteredView<'_>) -> Chart {
    let groups = view
        .equipment_ids()
        .into_iter()
        .filter_map(|eq| {
            let values: Vec<f64> = view
                .iter()
                .filter(|o| o.equipment_id == eq)
                .map(|o| o.measurement())
                .collect();
            BoxStats::from_values(&values).map(|stats| BoxGroup {
                equipment_id: eq,
                values,
                stats,
            })
        })
        .collect();

    Chart {
        kind: ViewKind::Distribution,
        title: ViewKind::Distribution.title().to_string(),
        x_label: "Equipment".to_string(),
        y_label: "Measurement (µm)".to_string(),
        y_range: None,
        body: ChartBody::Boxes { groups },
    }
}

/// Central-tendency view: bar height is the group mean
pub fn mean_chart(means: &[GroupMean]) -> Chart {
    Chart {
        kind: ViewKind::Mean,
        title: ViewKind::Mean.title().to_string(),
        x_label: "Equipment".to_string(),
        y_label: "Mean measurement (µm)".to_string(),
        y_range: None,
        body: ChartBody::Bars {
            bars: means
                .iter()
                .map(|g| Bar {
                    equipment_id: g.equipment_id.clone(),
                    value: g.mean,
                })
                .collect(),
        },
    }
}

/// Failure-rate view: bar height is the failure percentage, axis fixed to [0, 100]
pub fn failure_rate_chart(rates: &[GroupFailureRate]) -> Chart {
    Chart {
        kind: ViewKind::FailureRate,
        title: ViewKind::FailureRate.title().to_string(),
        x_label: "Equipment".to_string(),
        y_label: "Failure rate (%)".to_string(),
        y_range: Some([0.0, 100.0]),
        body: ChartBody::Bars {
            bars: rates
                .iter()
                .map(|g| Bar {
                    equipment_id: g.equipment_id.clone(),
                    value: g.rate_percent,
                })
                .collect(),
        },
    }
}

/// Time-series view: every observation, colored by equipment
///
/// Positions are taken from `view`, so they are exactly what a brush on this
/// chart reports back. Each series is ordered by time.
pub fn time_series_chart(
    view: &FilteredView<'_>,
    selection: Option<&Selection>,
    style: TimeSeriesStyle,
) -> Chart {
    let series: Vec<Series> = view
        .equipment_ids()
        .into_iter()
        .map(|eq| {
            let mut points: Vec<TimePoint> = view
                .iter()
                .enumerate()
                .filter(|(_, o)| o.equipment_id == eq)
                .map(|(position, o)| TimePoint {
                    position,
                    row: o.row,
                    timestamp: o.timestamp,
                    measurement: o.measurement(),
                    lot_id: o.lot_id.clone(),
                    wafer_id: o.wafer_id.clone(),
                    selected: selection.is_some_and(|s| s.contains_row(o.row)),
                })
                .collect();
            // lines connect points in slice order
            points.sort_by_key(|p| (p.timestamp, p.position));
            Series {
                equipment_id: eq,
                points,
            }
        })
        .collect();

    let largest = series.iter().map(|s| s.points.len()).max().unwrap_or(0);

    Chart {
        kind: ViewKind::TimeSeries,
        title: ViewKind::TimeSeries.title().to_string(),
        x_label: "Timestamp".to_string(),
        y_label: "Measurement (µm)".to_string(),
        y_range: None,
        body: ChartBody::Series {
            style: style.resolve(largest),
            series,
        },
    }
}

/// Presentation options
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub title: String,
    pub layout: Layout,
    pub time_style: TimeSeriesStyle,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            title: "Equipment quality statistics".to_string(),
            layout: Layout::default(),
            time_style: TimeSeriesStyle::default(),
        }
    }
}

/// One complete render of the four views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub layout: Layout,
    /// Equipment ids shown in the time-series view
    pub equipment: Vec<String>,
    /// Rows in the equipment-filtered view
    pub rows_in_view: usize,
    /// Rows feeding the dependent views when a selection is active
    pub rows_selected: Option<usize>,
    pub charts: Vec<Chart>,
}

impl Dashboard {
    pub fn chart(&self, kind: ViewKind) -> Option<&Chart> {
        self.charts.iter().find(|c| c.kind == kind)
    }
}

/// Build the four views
///
/// `equipment_view` feeds the time-series view; `dependent_view` (the
/// selection-restricted view, or the same view without a selection) feeds the
/// distribution, mean and failure-rate views.
pub fn build_dashboard(
    equipment_view: &FilteredView<'_>,
    dependent_view: &FilteredView<'_>,
    selection: Option<&Selection>,
    options: &DashboardOptions,
) -> Dashboard {
    let means = mean_by_equipment(dependent_view);
    let rates = failure_rate_by_equipment(dependent_view);

    Dashboard {
        title: options.title.clone(),
        layout: options.layout,
        equipment: equipment_view.equipment_ids(),
        rows_in_view: equipment_view.len(),
        rows_selected: selection.map(|_| dependent_view.len()),
        charts: vec![
            distribution_chart(dependent_view),
            mean_chart(&means),
            failure_rate_chart(&rates),
            time_series_chart(equipment_view, selection, options.time_style),
        ],
    }
}

/// A renderer that turns chart descriptions into a charting library's JSON
pub trait ChartBackend {
    /// Short backend name ("plotly", "vega")
    fn name(&self) -> &'static str;

    /// Figure / spec for one chart
    fn figure(&self, chart: &Chart) -> serde_json::Value;

    /// All four figures plus dashboard metadata
    fn dashboard(&self, dashboard: &Dashboard) -> serde_json::Value {
        serde_json::json!({
            "backend": self.name(),
            "title": dashboard.title,
            "layout": dashboard.layout,
            "equipment": dashboard.equipment,
            "rows_in_view": dashboard.rows_in_view,
            "rows_selected": dashboard.rows_selected,
            "figures": dashboard
                .charts
                .iter()
                .map(|c| serde_json::json!({ "id": c.kind.slug(), "figure": self.figure(c) }))
                .collect::<Vec<_>>(),
        })
    }
}

/// Format a timestamp the way both JS libraries parse it
pub(crate) fn iso_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}
