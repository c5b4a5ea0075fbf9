//! Test utilities for pipeline unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use evergreen_build::test_support::RecordingExecutor;
//!
//! let mut exec = RecordingExecutor::new().fail_at(2, 1);
//! let err = pipeline.run(&mut exec, &mut reporter).unwrap_err();
//! assert_eq!(exec.calls().len(), 3);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::util::diagnostic::PipelineError;
use crate::util::process::{CommandLine, Executor};

/// A command the recording executor was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Normalized command line.
    pub line: String,
    /// Working directory it was given.
    pub cwd: Option<PathBuf>,
}

/// Executor that records calls instead of spawning processes.
///
/// Every call "takes" a fixed duration. One call, chosen by index, can be
/// made to fail with an exit code.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Vec<RecordedCall>,
    duration: Duration,
    fail_at: Option<(usize, i32)>,
}

impl RecordingExecutor {
    /// Create an executor where every command succeeds instantly.
    pub fn new() -> Self {
        RecordingExecutor::default()
    }

    /// Report `duration` for every command.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Fail the `index`-th call (zero-based) with exit code `code`.
    pub fn fail_at(mut self, index: usize, code: i32) -> Self {
        self.fail_at = Some((index, code));
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Recorded command lines, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.line.as_str()).collect()
    }
}

impl Executor for RecordingExecutor {
    fn execute(
        &mut self,
        command: &CommandLine,
        cwd: Option<&Path>,
    ) -> Result<Duration, PipelineError> {
        let index = self.calls.len();
        let line = command.render();
        self.calls.push(RecordedCall {
            line: line.clone(),
            cwd: cwd.map(Path::to_path_buf),
        });

        match self.fail_at {
            Some((fail, code)) if fail == index => Err(PipelineError::ExternalToolFailure {
                command: line,
                code: Some(code),
                cause: None,
            }),
            _ => Ok(self.duration),
        }
    }
}
