//! Plotly figure JSON (`{ data, layout }`) for each chart

use serde_json::{json, Value};

use crate::views::{iso_timestamp, Chart, ChartBackend, ChartBody, TimeSeriesStyle};

/// Emits figures for plotly.js `Plotly.newPlot(el, data, layout)`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotlyBackend;

fn axis(title: &str) -> Value {
    json!({ "title": { "text": title } })
}

fn base_layout(chart: &Chart) -> Value {
    let mut yaxis = axis(&chart.y_label);
    if let Some([lo, hi]) = chart.y_range {
        yaxis["range"] = json!([lo, hi]);
        yaxis["autorange"] = json!(false);
    }
    json!({
        "title": { "text": chart.title },
        "xaxis": axis(&chart.x_label),
        "yaxis": yaxis,
        "margin": { "t": 48, "r": 16, "b": 48, "l": 56 },
    })
}

impl ChartBackend for PlotlyBackend {
    fn name(&self) -> &'static str {
        "plotly"
    }

    fn figure(&self, chart: &Chart) -> Value {
        let mut layout = base_layout(chart);

        let data: Vec<Value> = match &chart.body {
            ChartBody::Boxes { groups } => groups
                .iter()
                .map(|g| {
                    json!({
                        "type": "box",
                        "name": g.equipment_id,
                        "y": g.values,
                        "boxpoints": "all",
                        "jitter": 0.3,
                        "pointpos": 0,
                    })
                })
                .collect(),
            ChartBody::Bars { bars } => {
                vec![json!({
                    "type": "bar",
                    "x": bars.iter().map(|b| &b.equipment_id).collect::<Vec<_>>(),
                    "y": bars.iter().map(|b| b.value).collect::<Vec<_>>(),
                    "text": bars.iter().map(|b| format!("{:.3}", b.value)).collect::<Vec<_>>(),
                    "textposition": "auto",
                })]
            }
            ChartBody::Series { style, series } => {
                layout["dragmode"] = json!("select");
                layout["legend"] = json!({ "title": { "text": "Equipment" } });
                let mode = match style {
                    TimeSeriesStyle::Scatter => "markers",
                    _ => "lines+markers",
                };
                series
                    .iter()
                    .map(|s| {
                        let mut trace = json!({
                            "type": "scatter",
                            "mode": mode,
                            "name": s.equipment_id,
                            "x": s.points.iter().map(|p| iso_timestamp(&p.timestamp)).collect::<Vec<_>>(),
                            "y": s.points.iter().map(|p| p.measurement).collect::<Vec<_>>(),
                            "customdata": s
                                .points
                                .iter()
                                .map(|p| json!([p.lot_id, p.wafer_id, p.position]))
                                .collect::<Vec<_>>(),
                            "hovertemplate": "%{x}<br>%{y:.3f} µm<br>lot %{customdata[0]} / wafer %{customdata[1]}<extra>%{fullData.name}</extra>",
                        });
                        if s.points.iter().any(|p| p.selected) {
                            trace["selectedpoints"] = json!(s
                                .points
                                .iter()
                                .enumerate()
                                .filter(|(_, p)| p.selected)
                                .map(|(i, _)| i)
                                .collect::<Vec<_>>());
                        }
                        trace
                    })
                    .collect()
            }
        };

        json!({ "data": data, "layout": layout })
    }
}
