//! Configuration file support.
//!
//! Two optional locations are read:
//! - Global: `~/.evergreen/build.toml` - user-wide defaults
//! - Project: `<root>/.evergreen/build.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. Every key is
//! optional; unset keys fall back to the built-in pipeline constants.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::codegen::DEFAULT_GENERATOR;

/// Generator version installed by the `generate` pipeline.
pub const DEFAULT_GENERATOR_VERSION: &str = "18.1.0.3";

/// Variable naming the Vulkan SDK root.
pub const DEFAULT_SDK_VARIABLE: &str = "VULKAN_SDK";

/// Name of the config file in each config directory.
pub const CONFIG_FILE_NAME: &str = "build.toml";

/// Pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Binding generator settings
    pub generator: GeneratorConfig,

    /// SDK lookup settings
    pub sdk: SdkConfig,
}

/// Binding generator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Generator executable / dotnet tool name
    pub tool: Option<String>,

    /// Tool version passed to `dotnet tool install`
    pub version: Option<String>,
}

/// SDK lookup settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Environment variable holding the Vulkan SDK root
    pub variable: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.generator.tool.is_some() {
            self.generator.tool = other.generator.tool;
        }
        if other.generator.version.is_some() {
            self.generator.version = other.generator.version;
        }
        if other.sdk.variable.is_some() {
            self.sdk.variable = other.sdk.variable;
        }
    }

    /// Generator tool name.
    pub fn generator_tool(&self) -> &str {
        self.generator.tool.as_deref().unwrap_or(DEFAULT_GENERATOR)
    }

    /// Generator tool version.
    pub fn generator_version(&self) -> &str {
        self.generator
            .version
            .as_deref()
            .unwrap_or(DEFAULT_GENERATOR_VERSION)
    }

    /// Variable naming the SDK root.
    pub fn sdk_variable(&self) -> &str {
        self.sdk.variable.as_deref().unwrap_or(DEFAULT_SDK_VARIABLE)
    }
}

/// Get the global config directory (~/.evergreen).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".evergreen"))
}

/// Get the global config path (~/.evergreen/build.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (<root>/.evergreen/build.toml)
/// 2. Global config (~/.evergreen/build.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
