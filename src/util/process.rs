//! Subprocess execution utilities.
//!
//! Commands are typed [`CommandLine`] values. They render to a multi-line
//! template for readability and to a single normalized line for the host
//! shell. The [`Executor`] trait is the seam between the pipeline driver and
//! real processes.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::util::diagnostic::PipelineError;

/// Indentation for continuation lines of a command template.
const CONTINUATION_INDENT: &str = "    ";

/// A program and its arguments, grouped into display lines.
///
/// The first line holds the program and any arguments added with
/// [`CommandLine::arg`]. Each [`CommandLine::line`] call starts an indented
/// continuation line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    program: String,
    lines: Vec<Vec<String>>,
}

impl CommandLine {
    /// Create a command line for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        CommandLine {
            program: program.into(),
            lines: vec![Vec::new()],
        }
    }

    /// Add a single argument to the current line.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        if let Some(line) = self.lines.last_mut() {
            line.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add multiple arguments to the current line.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Start a new continuation line holding the given arguments.
    pub fn line<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lines.push(Vec::new());
        self.args(args)
    }

    /// Add a path argument to the current line.
    pub fn path_arg(self, path: impl AsRef<Path>) -> Self {
        let rendered = path.as_ref().display().to_string();
        self.arg(rendered)
    }

    /// Get the program name.
    pub fn get_program(&self) -> &str {
        &self.program
    }

    /// All arguments, in order, ignoring line grouping.
    pub fn get_args(&self) -> Vec<&str> {
        self.lines.iter().flatten().map(String::as_str).collect()
    }

    /// Render as a multi-line template, one argument group per line.
    pub fn render_template(&self) -> String {
        let mut out = quote_arg(&self.program);

        for (i, line) in self.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let joined = line
                .iter()
                .map(|a| quote_arg(a))
                .collect::<Vec<_>>()
                .join(" ");
            if i == 0 {
                out.push(' ');
            } else {
                out.push('\n');
                out.push_str(CONTINUATION_INDENT);
            }
            out.push_str(&joined);
        }

        out
    }

    /// Render as the single line submitted to the shell.
    pub fn render(&self) -> String {
        normalize_command_line(&self.render_template())
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Collapse a multi-line command template into one logical line.
///
/// Line breaks are removed; everything else is kept as-is, so a command that
/// is already on one line comes back unchanged.
pub fn normalize_command_line(command: &str) -> String {
    command.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Characters that force an argument to be quoted.
const SPECIAL: &[char] = &[
    '&', '|', '<', '>', '^', ';', '(', ')', '$', '`', '\'', '"', '*', '?',
];

/// Quote an argument for the host shell if it needs it.
///
/// `sh` gets single quotes, which suppress `$` and backtick expansion;
/// embedded single quotes become `'\''`. `cmd` gets double quotes.
pub fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || SPECIAL.contains(&c)) {
        return arg.to_string();
    }

    if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Runs command lines and reports how long they took.
pub trait Executor {
    /// Run `command`, optionally in `cwd`, and block until it exits.
    ///
    /// A nonzero exit status is an `ExternalToolFailure`.
    fn execute(&mut self, command: &CommandLine, cwd: Option<&Path>)
        -> Result<Duration, PipelineError>;
}

/// Executes commands through the host shell.
///
/// The normalized command line is echoed to stdout before it runs. The child
/// inherits stdio and the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    /// Create a new shell executor.
    pub fn new() -> Self {
        ShellExecutor
    }

    #[cfg(windows)]
    fn shell_command(line: &str) -> Command {
        use std::os::windows::process::CommandExt;

        let mut cmd = Command::new("cmd");
        cmd.arg("/C").raw_arg(line);
        cmd
    }

    #[cfg(not(windows))]
    fn shell_command(line: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }
}

impl Executor for ShellExecutor {
    fn execute(
        &mut self,
        command: &CommandLine,
        cwd: Option<&Path>,
    ) -> Result<Duration, PipelineError> {
        let line = command.render();
        println!("{}", line);

        let mut cmd = Self::shell_command(&line);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let status = cmd
            .status()
            .map_err(|e| PipelineError::ExternalToolFailure {
                command: line.clone(),
                code: None,
                cause: Some(e),
            })?;
        let elapsed = start.elapsed();

        if !status.success() {
            return Err(PipelineError::ExternalToolFailure {
                command: line,
                code: status.code(),
                cause: None,
            });
        }

        tracing::debug!("`{}` finished in {:?}", command.get_program(), elapsed);
        Ok(elapsed)
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
