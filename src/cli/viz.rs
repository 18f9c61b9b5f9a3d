//! Terminal visualization using braille graphics
//!
//! Draws the four dashboard views in the terminal: range bars for the
//! distribution view, block bars for the mean and failure-rate views and a
//! braille scatter/line plot (via `drawille`) for the time series.

use console::{measure_text_width, pad_str, style, Alignment};
use drawille::Canvas;

use crate::cli::helpers::truncate_str;
use crate::views::{Bar, BoxGroup, Chart, ChartBody, Dashboard, Layout, Series, TimeSeriesStyle, ViewKind};

/// Text rows used by the time-series canvas
pub const SERIES_ROWS: u32 = 12;

/// Narrowest terminal that still gets the side-by-side grid
pub const GRID_MIN_WIDTH: usize = 80;

const LABEL_WIDTH: usize = 8;

/// Map `value` in [lo, hi] onto 0..span (exclusive)
fn scale(value: f64, lo: f64, hi: f64, span: u32) -> u32 {
    if span == 0 {
        return 0;
    }
    if hi <= lo || !value.is_finite() {
        return span / 2;
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    (t * (span - 1) as f64).round() as u32
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn no_data() -> String {
    format!("  {}", style("(no data for the selected equipment)").dim())
}

fn label_width(ids: &[&str]) -> usize {
    ids.iter()
        .map(|id| id.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, LABEL_WIDTH)
}

/// Render the distribution view as one range bar per equipment
///
/// `├───[═══┃═══]───┤`: whiskers span min..max, the box spans q1..q3 and `┃`
/// marks the median. All rows share one scale.
pub fn render_box_panel(groups: &[BoxGroup], width: usize) -> Vec<String> {
    if groups.is_empty() {
        return vec![no_data()];
    }
    let ids: Vec<&str> = groups.iter().map(|g| g.equipment_id.as_str()).collect();
    let lw = label_width(&ids);
    let bar_width = width.saturating_sub(lw + 10).max(10);

    let (lo, hi) = finite_range(groups.iter().flat_map(|g| [g.stats.min, g.stats.max]))
        .unwrap_or((0.0, 1.0));
    let pos = |v: f64| scale(v, lo, hi, bar_width as u32) as usize;

    let mut lines = Vec::with_capacity(groups.len() + 1);
    for group in groups {
        let s = &group.stats;
        let mut bar = vec![' '; bar_width];
        let (p_min, p_max) = (pos(s.min), pos(s.max));
        let (p_q1, p_q3) = (pos(s.q1), pos(s.q3));

        for cell in bar.iter_mut().take(p_max + 1).skip(p_min) {
            *cell = '─';
        }
        for cell in bar.iter_mut().take(p_q3 + 1).skip(p_q1) {
            *cell = '═';
        }
        bar[p_min] = '├';
        bar[p_max] = '┤';
        if p_q3 > p_q1 {
            bar[p_q1] = '[';
            bar[p_q3] = ']';
        }
        bar[pos(s.median)] = '┃';

        lines.push(format!(
            "{:<lw$} {} n={}",
            truncate_str(&group.equipment_id, lw),
            bar.into_iter().collect::<String>(),
            group.values.len(),
        ));
    }

    let lo_label = format!("{:.3}", lo);
    let hi_label = format!("{:.3}", hi);
    let gap = bar_width.saturating_sub(lo_label.len() + hi_label.len());
    lines.push(format!(
        "{:lw$} {}{}{}",
        "",
        style(&lo_label).dim(),
        " ".repeat(gap),
        style(&hi_label).dim(),
    ));
    lines
}

/// Render a bar view with `█` bars
///
/// Bars start at zero; the scale is the fixed y-range when the chart has one,
/// otherwise the largest value.
pub fn render_bar_panel(chart: &Chart, bars: &[Bar], width: usize) -> Vec<String> {
    if bars.is_empty() {
        return vec![no_data()];
    }
    let ids: Vec<&str> = bars.iter().map(|b| b.equipment_id.as_str()).collect();
    let lw = label_width(&ids);
    let bar_width = width.saturating_sub(lw + 11).max(5);

    let top = match chart.y_range {
        Some([_, hi]) => hi,
        None => bars
            .iter()
            .map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max),
    };

    bars.iter()
        .map(|b| {
            let filled = if top > 0.0 && b.value.is_finite() {
                (((b.value.max(0.0) / top) * bar_width as f64).round() as usize).min(bar_width)
            } else {
                0
            };
            let value = match chart.kind {
                ViewKind::FailureRate => format!("{:.1}%", b.value),
                _ => format!("{:.3}", b.value),
            };
            format!(
                "{:<lw$} {}{} {:>8}",
                truncate_str(&b.equipment_id, lw),
                style("█".repeat(filled)).cyan(),
                " ".repeat(bar_width - filled),
                value,
            )
        })
        .collect()
}

/// Render the time-series view on a braille canvas
///
/// Selected points are drawn as 2x2 blobs; `LineMarkers` also connects each
/// equipment's points in time order.
pub fn render_series_panel(style_kind: TimeSeriesStyle, series: &[Series], width: usize) -> Vec<String> {
    let points: Vec<_> = series.iter().flat_map(|s| s.points.iter()).collect();
    if points.is_empty() {
        return vec![no_data()];
    }

    let cols = width.saturating_sub(LABEL_WIDTH + 1).max(10) as u32;
    let px_w = cols * 2;
    let px_h = SERIES_ROWS * 4;

    let (y_lo, y_hi) = finite_range(points.iter().map(|p| p.measurement)).unwrap_or((0.0, 1.0));
    let (t_lo, t_hi) = points
        .iter()
        .map(|p| p.timestamp.and_utc().timestamp())
        .fold((i64::MAX, i64::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));

    let to_px = |ts: i64, m: f64| -> (u32, u32) {
        let x = 1 + scale(ts as f64, t_lo as f64, t_hi as f64, px_w - 1);
        let y = (px_h - 2) - scale(m, y_lo, y_hi, px_h - 1);
        (x, y)
    };

    let mut canvas = Canvas::new(px_w, px_h);
    canvas.line(0, 0, 0, px_h - 1);
    canvas.line(0, px_h - 1, px_w - 1, px_h - 1);

    for s in series {
        let pixels: Vec<(u32, u32)> = s
            .points
            .iter()
            .map(|p| to_px(p.timestamp.and_utc().timestamp(), p.measurement))
            .collect();

        if style_kind == TimeSeriesStyle::LineMarkers {
            for pair in pixels.windows(2) {
                canvas.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
            }
        }
        for (p, &(x, y)) in s.points.iter().zip(&pixels) {
            canvas.set(x, y);
            if p.selected {
                canvas.set((x + 1).min(px_w - 1), y);
                canvas.set(x, y.saturating_sub(1));
                canvas.set((x + 1).min(px_w - 1), y.saturating_sub(1));
            }
        }
    }

    let frame = canvas.frame();
    let rows: Vec<&str> = frame.lines().collect();
    let last = rows.len().saturating_sub(1);
    let mut lines: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let label = if i == 0 {
                format!("{:>7.2}", y_hi)
            } else if i == last {
                format!("{:>7.2}", y_lo)
            } else {
                String::new()
            };
            format!("{:>7} {}", label, row)
        })
        .collect();

    let start = points.iter().map(|p| p.timestamp).min().unwrap_or_default();
    let end = points.iter().map(|p| p.timestamp).max().unwrap_or_default();
    let start_label = start.format("%Y-%m-%d").to_string();
    let end_label = end.format("%Y-%m-%d").to_string();
    let gap = (cols as usize).saturating_sub(start_label.len() + end_label.len());
    lines.push(format!(
        "{:7} {}{}{}",
        "",
        style(&start_label).dim(),
        " ".repeat(gap),
        style(&end_label).dim()
    ));

    let legend: Vec<String> = series
        .iter()
        .map(|s| {
            let selected = s.points.iter().filter(|p| p.selected).count();
            if selected > 0 {
                format!("{} ({} pts, {} selected)", s.equipment_id, s.points.len(), selected)
            } else {
                format!("{} ({} pts)", s.equipment_id, s.points.len())
            }
        })
        .collect();
    lines.push(format!("{:7} {}", "", legend.join("  ")));
    lines
}

/// Render one chart with its title line
pub fn render_panel(chart: &Chart, width: usize) -> Vec<String> {
    let mut lines = vec![style(&chart.title).bold().to_string()];
    let body = match &chart.body {
        ChartBody::Boxes { groups } => render_box_panel(groups, width),
        ChartBody::Bars { bars } => render_bar_panel(chart, bars, width),
        ChartBody::Series { style, series } => render_series_panel(*style, series, width),
    };
    lines.extend(body);
    lines
}

fn side_by_side(left: &[String], right: &[String], panel_width: usize) -> Vec<String> {
    let height = left.len().max(right.len());
    (0..height)
        .map(|i| {
            let l = left.get(i).map(String::as_str).unwrap_or("");
            let r = right.get(i).map(String::as_str).unwrap_or("");
            format!(
                "{}  {}",
                pad_str(l, panel_width, Alignment::Left, Some("…")),
                r
            )
        })
        .collect()
}

/// Render the whole dashboard for a terminal `width` columns wide
///
/// The grid layout falls back to stacked panels on narrow terminals.
pub fn render_dashboard(dashboard: &Dashboard, width: usize) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push(style(&dashboard.title).bold().underlined().to_string());
    let equipment = if dashboard.equipment.is_empty() {
        "none".to_string()
    } else {
        dashboard.equipment.join(", ")
    };
    let mut meta = format!(
        "{} rows · equipment: {}",
        style(dashboard.rows_in_view).cyan(),
        equipment
    );
    if let Some(selected) = dashboard.rows_selected {
        meta.push_str(&format!(" · selection: {} rows", style(selected).yellow()));
    }
    out.push(meta);
    out.push(String::new());

    let grid = dashboard.layout == Layout::Grid && width >= GRID_MIN_WIDTH;
    if grid {
        let panel_width = (width - 2) / 2;
        for pair in dashboard.charts.chunks(2) {
            let left = render_panel(&pair[0], panel_width);
            let right = pair
                .get(1)
                .map(|c| render_panel(c, panel_width))
                .unwrap_or_default();
            out.extend(side_by_side(&left, &right, panel_width));
            out.push(String::new());
        }
    } else {
        for chart in &dashboard.charts {
            out.extend(render_panel(chart, width));
            out.push(String::new());
        }
    }

    // drop the trailing blank line
    while out.last().is_some_and(|l| measure_text_width(l) == 0) {
        out.pop();
    }
    out.join("\n")
}
