// ghostwrite CLI entry point.

use std::path::PathBuf;
use std::process;

use clap::Parser;

mod commands;
mod context;
mod exit_code;
mod output;

use context::Context;
use exit_code::ExitCode;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "ghostwrite", about = "Collaborative documents with simulated co-authors")]
struct Cli {
    /// Database file (defaults to ~/.ghostwrite/ghostwrite.db).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Force JSON output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::new(cli.db, OutputFormat::detect(cli.json));

    match commands::run(cli.command, &ctx) {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => {
            output::print_anyhow_error(ctx.format, &error);
            ExitCode::from_error(&error).into()
        }
    }
}
