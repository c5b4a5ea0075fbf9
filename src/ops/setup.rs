//! Implementation of `evergreen-build setup`.
//!
//! Builds the third-party native libraries. Independent of `generate`; each
//! dependency's steps run in their own directories, in recipe order.

use std::io::Write;

use crate::ops::plan::warn_missing_programs;
use crate::pipeline::{Pipeline, PipelineReport, Stage, StageReporter};
use crate::project::{shipped_dependencies, ExternalDependencySpec, ProjectLayout};
use crate::util::diagnostic::PipelineError;
use crate::util::process::Executor;

/// Build the `setup` pipeline for the given dependencies.
pub fn setup_pipeline(layout: &ProjectLayout, dependencies: &[ExternalDependencySpec]) -> Pipeline {
    dependencies
        .iter()
        .fold(Pipeline::new("setup").in_dir(layout.root()), |pipeline, dep| {
            let stage = dep.steps.iter().fold(Stage::new(&dep.title), |stage, step| {
                stage.run_in(layout.path(&step.dir), step.command.clone())
            });
            pipeline.stage(stage)
        })
}

/// Build and run the `setup` pipeline for the shipped dependencies.
pub fn setup<W: Write>(
    layout: &ProjectLayout,
    executor: &mut dyn Executor,
    reporter: &mut StageReporter<W>,
) -> Result<PipelineReport, PipelineError> {
    let pipeline = setup_pipeline(layout, &shipped_dependencies());
    warn_missing_programs(&pipeline, &[]);
    pipeline.run(executor, reporter)
}
