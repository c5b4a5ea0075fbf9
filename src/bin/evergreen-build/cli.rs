//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// evergreen-build - builds Evergreen's native libraries and generated bindings
#[derive(Parser)]
#[command(name = "evergreen-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, env = "EVERGREEN_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build native modules, generate their bindings and build the bindings
    Generate,

    /// Build the third-party native dependencies
    Setup,

    /// Show the stages and commands a pipeline would run
    Plan(PlanArgs),
}

#[derive(Args)]
pub struct PlanArgs {
    /// Which pipeline to show
    #[arg(value_enum, default_value_t = PipelineKind::All)]
    pub pipeline: PipelineKind,

    /// Emit the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PipelineKind {
    Setup,
    Generate,
    All,
}
