//! `eqc generate` command - print the observation table

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::DataArgs;
use crate::cli::helpers::format_measurement;
use crate::cli::output::effective_format;
use crate::cli::table::TextTable;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::Observation;

use super::utils::{load_config, load_dataset};

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Only print failing rows
    #[arg(long)]
    pub failures_only: bool,

    /// Print at most N rows
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Print only the number of rows
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let dataset = load_dataset(&args.data, &config)?;

    let mut rows: Vec<&Observation> = dataset
        .observations()
        .iter()
        .filter(|o| !args.failures_only || o.pass_fail())
        .collect();
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    let format = effective_format(global.output);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let mut table = TextTable::new([
                "row",
                "equipment_id",
                "lot_id",
                "wafer_id",
                "timestamp",
                "measurement",
                "result",
            ]);
            for o in &rows {
                table.push_row(vec![
                    o.row.to_string(),
                    o.equipment_id.clone(),
                    o.lot_id.clone(),
                    o.wafer_id.clone(),
                    o.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    format_measurement(o.measurement()),
                    o.verdict().to_string(),
                ]);
            }
            print!("{}", table.render(format)?);

            if format == OutputFormat::Table {
                let limits = dataset.limits();
                println!(
                    "{} row(s), {} failing (LSL={:.3}, USL={:.3})",
                    style(rows.len()).cyan(),
                    style(rows.iter().filter(|o| o.pass_fail()).count()).red(),
                    limits.lsl(),
                    limits.usl()
                );
            }
        }
    }

    Ok(())
}
