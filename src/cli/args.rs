//! Top-level argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::dashboard::DashboardArgs;
use crate::cli::commands::generate::GenerateArgs;
use crate::cli::commands::stats::StatsArgs;

/// Equipment quality-control dashboard
#[derive(Parser, Debug)]
#[command(name = "eqc", version, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the observation table
    Generate(GenerateArgs),

    /// Per-equipment summary statistics
    Stats(StatsArgs),

    /// Render the four-view dashboard
    Dashboard(DashboardArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// Configuration file layered over the user and project config
    #[arg(long, global = true, env = "EQC_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table on a terminal, TSV when piped
    #[default]
    Auto,
    /// Aligned table with borders
    Table,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// Markdown table
    Md,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Auto => write!(f, "auto"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Md => write!(f, "md"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Where the observations come from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Use the 9-row demo table instead of generating data
    #[arg(long, conflicts_with_all = ["rows", "seed"])]
    pub demo: bool,

    /// Number of generated rows (overrides config)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Generator seed (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Equipment filter and selection inputs
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Equipment ids to include (comma-separated, default all)
    #[arg(long, short = 'e', value_delimiter = ',')]
    pub equipment: Option<Vec<String>>,

    /// Select points by position in the time-series view (comma-separated)
    #[arg(long, short = 's', value_delimiter = ',', conflicts_with_all = ["brush_from", "brush_to", "brush_min", "brush_max"])]
    pub select: Option<Vec<usize>>,

    /// Brush start (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[arg(long, value_parser = crate::cli::helpers::parse_datetime)]
    pub brush_from: Option<chrono::NaiveDateTime>,

    /// Brush end (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[arg(long, value_parser = crate::cli::helpers::parse_datetime)]
    pub brush_to: Option<chrono::NaiveDateTime>,

    /// Lowest measurement inside the brush
    #[arg(long, allow_hyphen_values = true)]
    pub brush_min: Option<f64>,

    /// Highest measurement inside the brush
    #[arg(long, allow_hyphen_values = true)]
    pub brush_max: Option<f64>,
}

impl SelectionArgs {
    /// Brush window built from the `--brush-*` flags, if any were given
    pub fn brush_window(&self) -> Option<crate::core::BrushWindow> {
        let window = crate::core::BrushWindow {
            from: self.brush_from,
            to: self.brush_to,
            min: self.brush_min,
            max: self.brush_max,
        };
        (!window.is_unbounded()).then_some(window)
    }
}
