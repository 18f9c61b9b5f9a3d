use clap::Parser;
use eqc::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    eqc::cli::logging::init_tracing(cli.global.verbose, cli.global.quiet);

    match cli.command {
        Commands::Generate(args) => eqc::cli::commands::generate::run(args, &cli.global),
        Commands::Stats(args) => eqc::cli::commands::stats::run(args, &cli.global),
        Commands::Dashboard(args) => eqc::cli::commands::dashboard::run(args, &cli.global),
        Commands::Completions(args) => eqc::cli::commands::completions::run(args),
    }
}
