//! Ordered, fail-fast stage execution.
//!
//! A [`Pipeline`] is a fixed list of [`Stage`]s built once at definition
//! time. Running it walks the stages in order, sends every command through an
//! [`Executor`], and stops at the first failure. Nothing is retried and
//! nothing is rolled back.

pub mod report;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::util::diagnostic::PipelineError;
use crate::util::process::{CommandLine, Executor};

pub use report::{format_duration, StageReporter};

/// One command of a stage, with the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub command: CommandLine,
    /// `None` runs in the pipeline's default directory.
    pub cwd: Option<PathBuf>,
}

/// A titled unit of pipeline work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub title: String,
    pub steps: Vec<Step>,
}

impl Stage {
    /// Create an empty stage.
    pub fn new(title: impl Into<String>) -> Self {
        Stage {
            title: title.into(),
            steps: Vec::new(),
        }
    }

    /// Append a command run in the pipeline's default directory.
    pub fn run(mut self, command: CommandLine) -> Self {
        self.steps.push(Step { command, cwd: None });
        self
    }

    /// Append a command run in `dir`.
    pub fn run_in(mut self, dir: impl Into<PathBuf>, command: CommandLine) -> Self {
        self.steps.push(Step {
            command,
            cwd: Some(dir.into()),
        });
        self
    }
}

/// Lifecycle of a stage within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Pending,
    Running,
    Succeeded,
    /// Terminal for the whole run.
    Failed,
}

/// Result of one stage after a run.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    pub title: String,
    pub state: StageState,
    /// Sum of the stage's command durations
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub pipeline: String,
    pub stages: Vec<StageOutcome>,
}

impl PipelineReport {
    /// Total time spent in external commands.
    pub fn total_elapsed(&self) -> Duration {
        self.stages.iter().map(|s| s.elapsed).sum()
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// A named, ordered list of stages.
#[derive(Debug, Clone, Serialize)]
pub struct Pipeline {
    pub name: String,
    /// Directory for steps without their own; `None` inherits the process cwd.
    pub default_dir: Option<PathBuf>,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new(name: impl Into<String>) -> Self {
        Pipeline {
            name: name.into(),
            default_dir: None,
            stages: Vec::new(),
        }
    }

    /// Set the default working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_dir = Some(dir.into());
        self
    }

    /// Append a stage.
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Every command in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandLine> {
        self.stages
            .iter()
            .flat_map(|s| s.steps.iter().map(|step| &step.command))
    }

    /// Run every stage in order, stopping at the first failure.
    pub fn run<W: Write>(
        &self,
        executor: &mut dyn Executor,
        reporter: &mut StageReporter<W>,
    ) -> Result<PipelineReport, PipelineError> {
        tracing::info!("running pipeline `{}` ({} stages)", self.name, self.stages.len());

        let mut states = vec![StageState::Pending; self.stages.len()];
        let mut outcomes = Vec::with_capacity(self.stages.len());

        for (i, stage) in self.stages.iter().enumerate() {
            states[i] = StageState::Running;
            reporter.begin(&stage.title);

            match self.run_stage(stage, executor) {
                Ok(elapsed) => {
                    states[i] = StageState::Succeeded;
                    reporter.end(&stage.title, elapsed);
                    outcomes.push(StageOutcome {
                        title: stage.title.clone(),
                        state: states[i],
                        elapsed,
                    });
                }
                Err(err) => {
                    states[i] = StageState::Failed;
                    let skipped = states.iter().filter(|s| **s == StageState::Pending).count();
                    tracing::error!(
                        "stage `{}` failed; {} remaining stage(s) not run",
                        stage.title,
                        skipped
                    );
                    return Err(err);
                }
            }
        }

        let report = PipelineReport {
            pipeline: self.name.clone(),
            stages: outcomes,
        };
        tracing::info!(
            "pipeline `{}` finished in {}",
            self.name,
            format_duration(report.total_elapsed())
        );
        Ok(report)
    }

    fn run_stage(
        &self,
        stage: &Stage,
        executor: &mut dyn Executor,
    ) -> Result<Duration, PipelineError> {
        let mut elapsed = Duration::ZERO;
        for step in &stage.steps {
            let cwd: Option<&Path> = step.cwd.as_deref().or(self.default_dir.as_deref());
            elapsed += executor.execute(&step.command, cwd)?;
        }
        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingExecutor;

    fn pipeline() -> Pipeline {
        Pipeline::new("test")
            .in_dir("/project")
            .stage(
                Stage::new("first")
                    .run(CommandLine::new("one"))
                    .run_in("/deps/sdl", CommandLine::new("two")),
            )
            .stage(Stage::new("second").run(CommandLine::new("three")))
            .stage(Stage::new("third").run(CommandLine::new("four")))
    }

    #[test]
    fn test_runs_all_stages_in_order() {
        let mut exec = RecordingExecutor::new().with_duration(Duration::from_millis(10));
        let mut reporter = StageReporter::new(Vec::new());

        let report = pipeline().run(&mut exec, &mut reporter).unwrap();

        assert_eq!(exec.lines(), vec!["one", "two", "three", "four"]);
        assert_eq!(report.stages.len(), 3);
        assert!(report.stages.iter().all(|s| s.state == StageState::Succeeded));
        assert_eq!(report.stages[0].elapsed, Duration::from_millis(20));
        assert_eq!(report.total_elapsed(), Duration::from_millis(40));
    }

    #[test]
    fn test_step_directories() {
        let mut exec = RecordingExecutor::new();
        let mut reporter = StageReporter::new(Vec::new());
        pipeline().run(&mut exec, &mut reporter).unwrap();

        let calls = exec.calls();
        assert_eq!(calls[0].cwd, Some(PathBuf::from("/project")));
        assert_eq!(calls[1].cwd, Some(PathBuf::from("/deps/sdl")));
    }

    #[test]
    fn test_fail_fast_at_every_index() {
        let total = pipeline().commands().count();

        for fail_at in 0..total {
            let mut exec = RecordingExecutor::new().fail_at(fail_at, 1);
            let mut reporter = StageReporter::new(Vec::new());

            let err = pipeline().run(&mut exec, &mut reporter).unwrap_err();
            assert!(matches!(
                err,
                PipelineError::ExternalToolFailure { code: Some(1), .. }
            ));
            // Nothing after the failing command was invoked.
            assert_eq!(exec.calls().len(), fail_at + 1);
        }
    }

    #[test]
    fn test_failed_stage_has_no_finish_banner() {
        let mut exec = RecordingExecutor::new().fail_at(2, 1);
        let mut reporter = StageReporter::new(Vec::new());
        pipeline().run(&mut exec, &mut reporter).unwrap_err();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.contains("first - Finished"));
        assert!(output.contains("second - Started"));
        assert!(!output.contains("second - Finished"));
        assert!(!output.contains("third"));
    }

    #[test]
    fn test_report_serializes_millis() {
        let mut exec = RecordingExecutor::new().with_duration(Duration::from_millis(5));
        let mut reporter = StageReporter::new(Vec::new());
        let report = pipeline().run(&mut exec, &mut reporter).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pipeline"], "test");
        assert_eq!(json["stages"][0]["state"], "succeeded");
        assert_eq!(json["stages"][0]["elapsed"], 10);
    }
}
