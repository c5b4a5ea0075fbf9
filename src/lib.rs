//! evergreen-build - build orchestration for the Evergreen engine
//!
//! This crate drives the external tools that build Evergreen's native
//! libraries, generate C# bindings from their headers, and build those
//! bindings. It also builds the third-party native dependencies.

pub mod codegen;
pub mod ops;
pub mod pipeline;
pub mod project;
pub mod util;

/// Test utilities for unit tests.
///
/// Only available when compiling with `--cfg test`. Provides a recording
/// executor that stands in for real processes.
#[cfg(test)]
pub mod test_support;

pub use codegen::{CodegenInvocation, ModuleCodegenSpec};
pub use pipeline::{Pipeline, PipelineReport, Stage, StageReporter};
pub use project::ProjectLayout;
pub use util::{CommandLine, Config, EnvResolver, Executor, PipelineError, ShellExecutor};
