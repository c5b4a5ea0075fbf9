//! Binding generator invocations.
//!
//! Every module is generated with the same tool and the same flag set. A
//! [`ModuleCodegenSpec`] holds the only things that vary between modules:
//! namespace, library, header, output directory, include directories,
//! exclusions and renames. Adding a module means adding a spec value, not
//! code.

pub mod order;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::util::diagnostic::PipelineError;
use crate::util::process::CommandLine;

pub use order::check_module_order;

/// Default binding generator executable.
pub const DEFAULT_GENERATOR: &str = "ClangSharpPInvokeGenerator";

/// Generation flags shared by every module.
pub const GENERATION_FLAGS: [&str; 5] = [
    "multi-file",
    "generate-file-scoped-namespaces",
    "generate-helper-types",
    "strip-enum-member-type-name",
    "exclude-enum-operators",
];

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("namespace pattern is valid")
});

/// A native type name mapped to a target-side type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub native: String,
    pub target: String,
}

impl Rename {
    /// The `native=target` form the generator expects.
    pub fn to_arg(&self) -> String {
        format!("{}={}", self.native, self.target)
    }
}

/// Everything needed to generate and build one module's bindings.
///
/// Paths are relative to the project root unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCodegenSpec {
    /// Short display name (e.g. "Window")
    pub title: String,
    /// Namespace of the generated code
    pub namespace: String,
    /// Native library the bindings load
    pub library: String,
    /// Input header
    pub header: PathBuf,
    /// Directory receiving generated sources
    pub output_dir: PathBuf,
    /// Managed project that compiles the generated sources
    pub project: PathBuf,
    /// Extra header search paths
    pub include_dirs: Vec<PathBuf>,
    /// Types passed through without wrappers
    pub excluded: Vec<String>,
    /// Type substitutions, in declared order
    pub renames: Vec<Rename>,
}

impl ModuleCodegenSpec {
    /// Create a spec with no includes, exclusions or renames.
    pub fn new(
        title: impl Into<String>,
        namespace: impl Into<String>,
        library: impl Into<String>,
    ) -> Self {
        ModuleCodegenSpec {
            title: title.into(),
            namespace: namespace.into(),
            library: library.into(),
            header: PathBuf::new(),
            output_dir: PathBuf::new(),
            project: PathBuf::new(),
            include_dirs: Vec::new(),
            excluded: Vec::new(),
            renames: Vec::new(),
        }
    }

    /// Set the input header.
    pub fn header(mut self, header: impl Into<PathBuf>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the managed project file.
    pub fn project(mut self, project: impl Into<PathBuf>) -> Self {
        self.project = project.into();
        self
    }

    /// Add an include directory.
    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    /// Exclude types from wrapping.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// Map a native type to a target type.
    pub fn rename(mut self, native: impl Into<String>, target: impl Into<String>) -> Self {
        self.renames.push(Rename {
            native: native.into(),
            target: target.into(),
        });
        self
    }

    /// Look up the target for a native name.
    pub fn rename_of(&self, native: &str) -> Option<&str> {
        self.renames
            .iter()
            .find(|r| r.native == native)
            .map(|r| r.target.as_str())
    }

    /// Check the spec's internal invariants.
    ///
    /// - the namespace is a dotted identifier
    /// - rename keys are unique
    /// - every excluded type is also renamed
    ///
    /// Rename targets are not checked; they may name third-party types.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !NAMESPACE_RE.is_match(&self.namespace) {
            return Err(PipelineError::malformed(
                &self.title,
                format!("`{}` is not a valid namespace", self.namespace),
            ));
        }

        let mut seen = HashSet::new();
        for rename in &self.renames {
            if !seen.insert(rename.native.as_str()) {
                return Err(PipelineError::malformed(
                    &self.title,
                    format!("`{}` is renamed more than once", rename.native),
                ));
            }
        }

        for name in &self.excluded {
            if !seen.contains(name.as_str()) {
                return Err(PipelineError::malformed(
                    &self.title,
                    format!("excluded type `{}` has no rename", name),
                ));
            }
        }

        Ok(())
    }
}

/// Builds the generator command for one module.
#[derive(Debug, Clone)]
pub struct CodegenInvocation<'a> {
    spec: &'a ModuleCodegenSpec,
    generator: String,
    root: Option<PathBuf>,
}

impl<'a> CodegenInvocation<'a> {
    /// Create an invocation using the default generator.
    pub fn new(spec: &'a ModuleCodegenSpec) -> Self {
        CodegenInvocation {
            spec,
            generator: DEFAULT_GENERATOR.to_string(),
            root: None,
        }
    }

    /// Use a different generator executable.
    pub fn generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    /// Resolve relative paths against `root`.
    pub fn root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Validate the spec and build the command.
    ///
    /// Argument groups, one per line: includes, namespace, library, header,
    /// output directory, flags, exclusions, renames.
    pub fn build(&self) -> Result<CommandLine, PipelineError> {
        let spec = self.spec;
        spec.validate()?;

        let mut cmd = CommandLine::new(&self.generator);

        for dir in &spec.include_dirs {
            cmd = cmd.line(["-I".to_string(), self.resolve(dir).display().to_string()]);
        }

        cmd = cmd
            .line(["-n", spec.namespace.as_str()])
            .line(["-l", spec.library.as_str()])
            .line(["--file".to_string(), self.resolve(&spec.header).display().to_string()])
            .line(["-o".to_string(), self.resolve(&spec.output_dir).display().to_string()])
            .line(["-c"])
            .args(GENERATION_FLAGS);

        if !spec.excluded.is_empty() {
            cmd = cmd.line(["-e"]).args(&spec.excluded);
        }

        if !spec.renames.is_empty() {
            cmd = cmd
                .line(["-r"])
                .args(spec.renames.iter().map(Rename::to_arg));
        }

        Ok(cmd)
    }
}
