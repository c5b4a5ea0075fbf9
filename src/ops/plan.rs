//! Implementation of `evergreen-build plan`, plus the PATH preflight check
//! shared by the runnable pipelines.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::pipeline::Pipeline;
use crate::util::process::find_executable;

/// Programs that are shell builtins or project-local scripts, not PATH tools.
const NOT_ON_PATH: &[&str] = &["mkdir"];
const SCRIPT_EXTENSIONS: &[&str] = &[".bat", ".cmd", ".sh"];

/// A command as it would run.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCommand {
    pub cwd: Option<PathBuf>,
    /// Normalized single-line form
    pub line: String,
    /// Multi-line template form
    pub template: String,
}

/// One stage as it would run.
#[derive(Debug, Clone, Serialize)]
pub struct StagePlan {
    pub title: String,
    pub commands: Vec<PlannedCommand>,
}

/// A pipeline as it would run, without running it.
#[derive(Debug, Clone, Serialize)]
pub struct PipelinePlan {
    pub name: String,
    pub stages: Vec<StagePlan>,
    /// Programs referenced by the pipeline that are not on PATH
    pub missing_programs: Vec<String>,
}

/// Describe `pipeline` without running it.
///
/// Programs listed in `provided` are installed by the pipeline itself and
/// are not reported as missing.
pub fn plan(pipeline: &Pipeline, provided: &[&str]) -> PipelinePlan {
    let stages = pipeline
        .stages
        .iter()
        .map(|stage| StagePlan {
            title: stage.title.clone(),
            commands: stage
                .steps
                .iter()
                .map(|step| PlannedCommand {
                    cwd: step.cwd.clone().or_else(|| pipeline.default_dir.clone()),
                    line: step.command.render(),
                    template: step.command.render_template(),
                })
                .collect(),
        })
        .collect();

    PipelinePlan {
        name: pipeline.name.clone(),
        stages,
        missing_programs: missing_programs(pipeline, provided),
    }
}

/// Programs the pipeline runs that cannot be found on PATH.
pub fn missing_programs(pipeline: &Pipeline, provided: &[&str]) -> Vec<String> {
    let programs: BTreeSet<&str> = pipeline.commands().map(|c| c.get_program()).collect();

    programs
        .into_iter()
        .filter(|p| !provided.contains(p))
        .filter(|p| !NOT_ON_PATH.contains(p))
        .filter(|p| !SCRIPT_EXTENSIONS.iter().any(|ext| p.ends_with(ext)))
        .filter(|p| find_executable(p).is_none())
        .map(str::to_string)
        .collect()
}

/// Log a warning for each program the pipeline will not find.
///
/// Never fails: a missing tool surfaces as a tool failure when its stage runs.
pub fn warn_missing_programs(pipeline: &Pipeline, provided: &[&str]) {
    for program in missing_programs(pipeline, provided) {
        tracing::warn!("`{}` was not found on PATH", program);
    }
}

/// Format a plan for terminal output.
pub fn format_plan(plan: &PipelinePlan) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} ({} stages)", plan.name, plan.stages.len());
    for (i, stage) in plan.stages.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {}", i + 1, stage.title);
        for cmd in &stage.commands {
            if let Some(cwd) = &cmd.cwd {
                let _ = writeln!(out, "      # in {}", cwd.display());
            }
            for line in cmd.template.lines() {
                let _ = writeln!(out, "      {}", line);
            }
        }
    }

    if !plan.missing_programs.is_empty() {
        let _ = writeln!(
            out,
            "  missing from PATH: {}",
            plan.missing_programs.join(", ")
        );
    }

    out
}
