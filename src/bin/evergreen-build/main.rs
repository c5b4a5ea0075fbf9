//! evergreen-build CLI

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use evergreen_build::util::diagnostic::{emit, PipelineError};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<PipelineError>() {
            Some(err) => {
                emit(&err.to_diagnostic(), color);
                std::process::exit(err.exit_code());
            }
            None => {
                eprintln!("error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("evergreen_build=debug")
    } else {
        EnvFilter::new("evergreen_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .init();

    let ctx = commands::Context::new(cli.root.as_deref(), color)?;

    match cli.command {
        Commands::Generate => commands::generate::execute(&ctx),
        Commands::Setup => commands::setup::execute(&ctx),
        Commands::Plan(args) => commands::plan::execute(&ctx, args),
    }
}
