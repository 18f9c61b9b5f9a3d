//! Vega-Lite v5 specs, the alternate charting backend

use serde_json::{json, Value};

use crate::views::{iso_timestamp, Chart, ChartBackend, ChartBody, TimeSeriesStyle};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Emits specs for `vegaEmbed(el, spec)`
#[derive(Debug, Clone, Copy, Default)]
pub struct VegaLiteBackend;

fn equipment_x(chart: &Chart) -> Value {
    json!({ "field": "equipment_id", "type": "nominal", "title": chart.x_label })
}

impl ChartBackend for VegaLiteBackend {
    fn name(&self) -> &'static str {
        "vega"
    }

    fn figure(&self, chart: &Chart) -> Value {
        let mut spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": chart.title,
            "width": "container",
            "height": 260,
        });

        match &chart.body {
            ChartBody::Boxes { groups } => {
                let values: Vec<Value> = groups
                    .iter()
                    .flat_map(|g| {
                        g.values
                            .iter()
                            .map(move |v| json!({ "equipment_id": g.equipment_id, "measurement": v }))
                    })
                    .collect();
                let y = json!({ "field": "measurement", "type": "quantitative", "title": chart.y_label, "scale": { "zero": false } });
                spec["data"] = json!({ "values": values });
                spec["layer"] = json!([
                    {
                        "mark": { "type": "boxplot", "extent": "min-max" },
                        "encoding": { "x": equipment_x(chart), "y": y },
                    },
                    {
                        "mark": { "type": "point", "opacity": 0.5, "filled": true },
                        "encoding": { "x": equipment_x(chart), "y": y },
                    }
                ]);
            }
            ChartBody::Bars { bars } => {
                let values: Vec<Value> = bars
                    .iter()
                    .map(|b| json!({ "equipment_id": b.equipment_id, "value": b.value }))
                    .collect();
                let mut y = json!({ "field": "value", "type": "quantitative", "title": chart.y_label });
                if let Some([lo, hi]) = chart.y_range {
                    y["scale"] = json!({ "domain": [lo, hi] });
                }
                spec["data"] = json!({ "values": values });
                spec["layer"] = json!([
                    {
                        "mark": "bar",
                        "encoding": { "x": equipment_x(chart), "y": y },
                    },
                    {
                        "mark": { "type": "text", "dy": -6 },
                        "encoding": {
                            "x": equipment_x(chart),
                            "y": y,
                            "text": { "field": "value", "type": "quantitative", "format": ".3f" },
                        },
                    }
                ]);
            }
            ChartBody::Series { style, series } => {
                let values: Vec<Value> = series
                    .iter()
                    .flat_map(|s| {
                        s.points.iter().map(move |p| {
                            json!({
                                "equipment_id": s.equipment_id,
                                "timestamp": iso_timestamp(&p.timestamp),
                                "measurement": p.measurement,
                                "lot_id": p.lot_id,
                                "wafer_id": p.wafer_id,
                                "position": p.position,
                                "selected": p.selected,
                            })
                        })
                    })
                    .collect();
                let mark = match style {
                    TimeSeriesStyle::Scatter => json!({ "type": "point", "filled": true }),
                    _ => json!({ "type": "line", "point": true }),
                };
                spec["data"] = json!({ "values": values });
                spec["mark"] = mark;
                spec["params"] = json!([{ "name": "brush", "select": { "type": "interval" } }]);
                spec["encoding"] = json!({
                    "x": { "field": "timestamp", "type": "temporal", "title": chart.x_label },
                    "y": { "field": "measurement", "type": "quantitative", "title": chart.y_label, "scale": { "zero": false } },
                    "color": { "field": "equipment_id", "type": "nominal", "title": "Equipment" },
                    "tooltip": [
                        { "field": "equipment_id", "title": "Equipment" },
                        { "field": "timestamp", "type": "temporal" },
                        { "field": "measurement", "format": ".3f" },
                        { "field": "lot_id", "title": "Lot" },
                        { "field": "wafer_id", "title": "Wafer" },
                    ],
                });
                if values.iter().any(|v| v["selected"] == json!(true)) {
                    spec["encoding"]["size"] = json!({
                        "condition": { "test": "datum.selected", "value": 90 },
                        "value": 20,
                    });
                }
            }
        }

        spec
    }
}
