//! `eqc stats` command - per-equipment summary table

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{DataArgs, SelectionArgs};
use crate::cli::helpers::{format_measurement, format_percent};
use crate::cli::output::effective_format;
use crate::cli::table::TextTable;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{overall_mean, summarize};

use super::utils::{apply_selection, load_config, load_dataset, new_session};

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let dataset = load_dataset(&args.data, &config)?;

    let mut session = new_session(dataset, config.dashboard_options());
    apply_selection(&mut session, &args.selection);

    let view = session.dependent_view();
    let summary = summarize(&view);

    let format = effective_format(global.output);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&summary).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if summary.is_empty() && format == OutputFormat::Table {
                println!("No observations for the selected equipment.");
                return Ok(());
            }

            let mut table = TextTable::new([
                "equipment_id",
                "count",
                "mean",
                "min",
                "max",
                "failures",
                "failure_rate",
            ]);
            for g in &summary {
                table.push_row(vec![
                    g.equipment_id.clone(),
                    g.count.to_string(),
                    format_measurement(g.mean),
                    format_measurement(g.min),
                    format_measurement(g.max),
                    g.failures.to_string(),
                    format_percent(g.failure_rate),
                ]);
            }
            print!("{}", table.render(format)?);

            if format == OutputFormat::Table {
                let mean = overall_mean(&view)
                    .map(format_measurement)
                    .unwrap_or_else(|| "-".to_string());
                print!(
                    "{} observation(s), overall mean {}",
                    style(view.len()).cyan(),
                    style(mean).cyan()
                );
                if session.selection_state().is_selected() {
                    print!(" ({})", style("selection").yellow());
                }
                println!();
            }
        }
    }

    Ok(())
}
