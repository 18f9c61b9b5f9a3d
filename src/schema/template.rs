//! HTML page generation for exported dashboards

use chrono::Utc;
use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::views::{ChartBackend, Dashboard};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const DASHBOARD_TEMPLATE: &str = "dashboard.html.tera";

/// Template generator using Tera
pub struct TemplateGenerator {
    tera: Tera,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

#[derive(Serialize)]
struct Panel {
    id: &'static str,
    title: String,
    spec: String,
}

/// JSON safe to inline inside a `<script>` element
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

impl TemplateGenerator {
    /// Create a new template generator with embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Render a standalone HTML page for a dashboard
    pub fn render_dashboard(
        &self,
        dashboard: &Dashboard,
        backend: &dyn ChartBackend,
        session_id: &str,
    ) -> Result<String, TemplateError> {
        if !self
            .tera
            .get_template_names()
            .any(|n| n == DASHBOARD_TEMPLATE)
        {
            return Err(TemplateError::NotFound(DASHBOARD_TEMPLATE.to_string()));
        }

        let panels: Vec<Panel> = dashboard
            .charts
            .iter()
            .map(|chart| Panel {
                id: chart.kind.slug(),
                title: chart.title.clone(),
                spec: script_json(&backend.figure(chart)),
            })
            .collect();

        let mut context = tera::Context::new();
        context.insert("title", &dashboard.title);
        context.insert("backend", backend.name());
        context.insert("layout", &dashboard.layout.to_string());
        context.insert("equipment", &dashboard.equipment);
        context.insert("rows_in_view", &dashboard.rows_in_view);
        context.insert("rows_selected", &dashboard.rows_selected);
        context.insert("session_id", session_id);
        context.insert(
            "generated",
            &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        context.insert("panels", &panels);

        self.tera
            .render(DASHBOARD_TEMPLATE, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}
