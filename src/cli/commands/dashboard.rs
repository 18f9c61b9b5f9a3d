//! `eqc dashboard` command - render the four views

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{DataArgs, SelectionArgs};
use crate::cli::filters::{CliBackend, CliLayout, CliTimeStyle};
use crate::cli::viz::render_dashboard;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Session;
use crate::schema::TemplateGenerator;
use crate::views::{BackendKind, ChartBackend, Dashboard};

use super::interactive;
use super::utils::{apply_selection, load_config, load_dataset, new_session};

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Rendering backend (default from config: terminal)
    #[arg(long, short = 'b', value_enum)]
    pub backend: Option<CliBackend>,

    /// Panel arrangement
    #[arg(long, value_enum)]
    pub layout: Option<CliLayout>,

    /// Time-series mark style
    #[arg(long, value_enum)]
    pub time_style: Option<CliTimeStyle>,

    /// Dashboard title
    #[arg(long)]
    pub title: Option<String>,

    /// Terminal width in columns
    #[arg(long, value_parser = clap::value_parser!(u32).range(40..))]
    pub width: Option<u32>,

    /// Write an HTML page (plotly or vega backend)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Drive the dashboard with prompts
    #[arg(long, short = 'i', conflicts_with = "out")]
    pub interactive: bool,
}

pub fn run(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let dataset = load_dataset(&args.data, &config)?;

    let mut options = config.dashboard_options();
    if let Some(layout) = args.layout {
        options.layout = layout.into();
    }
    if let Some(time_style) = args.time_style {
        options.time_style = time_style.into();
    }
    if let Some(title) = args.title {
        options.title = title;
    }
    let backend: BackendKind = args
        .backend
        .map(Into::into)
        .unwrap_or(config.dashboard.backend);
    let width = args.width.unwrap_or(config.dashboard.width) as usize;

    let mut session = new_session(dataset, options);
    apply_selection(&mut session, &args.selection);

    if args.interactive {
        return interactive::run(session, backend, width);
    }

    let dashboard = session.render();
    match backend.chart_backend() {
        None => {
            if args.out.is_some() {
                return Err(miette::miette!(
                    help = "use --backend plotly or --backend vega",
                    "HTML export needs a chart backend"
                ));
            }
            match global.output {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&dashboard).into_diagnostic()?;
                    println!("{}", json);
                }
                OutputFormat::Yaml => {
                    let yaml = serde_yml::to_string(&dashboard).into_diagnostic()?;
                    print!("{}", yaml);
                }
                _ => println!("{}", render_dashboard(&dashboard, width)),
            }
        }
        Some(chart_backend) => match args.out {
            Some(ref path) => {
                export_html(&session, &dashboard, chart_backend.as_ref(), path)?;
            }
            None => {
                let doc = chart_backend.dashboard(&dashboard);
                match global.output {
                    OutputFormat::Yaml => {
                        let yaml = serde_yml::to_string(&doc).into_diagnostic()?;
                        print!("{}", yaml);
                    }
                    _ => {
                        let json = serde_json::to_string_pretty(&doc).into_diagnostic()?;
                        println!("{}", json);
                    }
                }
            }
        },
    }

    Ok(())
}

/// Write the dashboard as a standalone HTML page
pub fn export_html(
    session: &Session,
    dashboard: &Dashboard,
    backend: &dyn ChartBackend,
    path: &Path,
) -> Result<()> {
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let html = generator
        .render_dashboard(dashboard, backend, &session.id().to_string())
        .map_err(|e| miette::miette!("{}", e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(path, html).into_diagnostic()?;

    eprintln!(
        "{} Wrote {} dashboard to {}",
        style("✓").green(),
        backend.name(),
        style(path.display()).cyan()
    );
    Ok(())
}
