//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod env;
pub mod process;

pub use config::Config;
pub use diagnostic::{Diagnostic, PipelineError};
pub use env::{ConfigProvider, EnvResolver};
pub use process::{CommandLine, Executor, ShellExecutor};
