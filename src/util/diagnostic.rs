//! Pipeline errors and user-friendly diagnostic messages.
//!
//! Every failure carries enough context to tell the operator what was
//! attempted and what to do about it. Errors are returned up to the binary,
//! which renders them with [`PipelineError::to_diagnostic`] and exits.

use std::fmt;
use std::io;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the SDK root cannot be located.
    pub const SDK_MISSING: &str =
        "Install the Vulkan SDK, or export the variable before running `evergreen-build`";

    /// Suggestion when an external tool fails.
    pub const TOOL_FAILED: &str =
        "Scroll up for the tool's own output; the failing command is printed above it";

    /// Suggestion when a tool could not be started at all.
    pub const TOOL_NOT_STARTED: &str =
        "Check that the working directory exists (run `evergreen-build setup` first)";

    /// Suggestion when module data is inconsistent.
    pub const FIX_MODULE_DATA: &str =
        "Fix the module definition; run `evergreen-build plan` to inspect generated commands";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m".to_string(),
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m".to_string(),
            }
        } else {
            self.severity.to_string()
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Everything that can stop a pipeline run.
///
/// None of these are recoverable: the driver stops at the first one and the
/// binary exits with [`PipelineError::exit_code`].
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PipelineError {
    /// A required environment or registry value is absent.
    #[error("required configuration value `{name}` is not set")]
    #[diagnostic(code(evergreen::config::missing))]
    ConfigurationMissing {
        name: String,
        /// Where the value was looked up, in lookup order.
        searched: Vec<String>,
    },

    /// An external command returned nonzero or could not be started.
    #[error("`{command}` failed: {}", exit_description(.code, .cause))]
    #[diagnostic(code(evergreen::exec::tool_failed))]
    ExternalToolFailure {
        command: String,
        code: Option<i32>,
        #[source]
        cause: Option<io::Error>,
    },

    /// Command data is inconsistent and cannot be rendered.
    #[error("malformed invocation for `{subject}`: {reason}")]
    #[diagnostic(code(evergreen::codegen::malformed))]
    MalformedInvocation { subject: String, reason: String },
}

fn exit_description(code: &Option<i32>, cause: &Option<io::Error>) -> String {
    match (code, cause) {
        (_, Some(err)) => format!("could not be started ({})", err),
        (Some(code), None) => format!("exit code {}", code),
        (None, None) => "terminated by signal".to_string(),
    }
}

impl PipelineError {
    /// Create a configuration-missing error.
    pub fn missing(name: impl Into<String>, searched: Vec<String>) -> Self {
        PipelineError::ConfigurationMissing {
            name: name.into(),
            searched,
        }
    }

    /// Create a malformed-invocation error.
    pub fn malformed(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedInvocation {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PipelineError::ConfigurationMissing { name, searched } => {
                let mut diag = Diagnostic::error(self.to_string());
                for source in searched {
                    diag = diag.with_context(format!("not found in {}", source));
                }
                diag.with_suggestion(format!("Set `{}` to the SDK install root", name))
                    .with_suggestion(suggestions::SDK_MISSING)
            }

            PipelineError::ExternalToolFailure { command, cause, .. } => {
                let diag = Diagnostic::error(self.to_string())
                    .with_context(format!("command: {}", command));
                if cause.is_some() {
                    diag.with_suggestion(suggestions::TOOL_NOT_STARTED)
                } else {
                    diag.with_suggestion(suggestions::TOOL_FAILED)
                }
            }

            PipelineError::MalformedInvocation { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::FIX_MODULE_DATA)
            }
        }
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
