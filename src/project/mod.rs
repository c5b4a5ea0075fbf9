//! The Evergreen project: its layout, native modules and third-party
//! dependencies.
//!
//! Everything here is static data. The pipelines built from it live in
//! [`crate::ops`].

pub mod dependencies;
pub mod modules;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use dependencies::{shipped_dependencies, ExternalDependencySpec, SetupStep};
pub use modules::{native_libraries, shipped_modules, NativeLibrary};

/// Paths relative to the project root, resolved to absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at `root`, made absolute against the cwd.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = std::path::absolute(root)
            .with_context(|| format!("failed to resolve project root: {}", root.display()))?;
        Ok(ProjectLayout { root })
    }

    /// Layout rooted at the current directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Ok(ProjectLayout { root: cwd })
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a project-relative path.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Directory holding the project's `build.toml`.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(".evergreen")
    }
}
