//! Configuration value lookup.
//!
//! Values come from two read-only sources: the process environment and a
//! system-wide persistent store. On Windows the store is the machine
//! environment in the registry; elsewhere it is `/etc/environment`.
//!
//! The driver never reads ambient state directly. It receives an
//! [`EnvResolver`] built from [`ConfigProvider`] backends, so tests can swap
//! in a [`MemoryEnv`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::util::diagnostic::PipelineError;

/// Registry key holding the machine-wide environment on Windows.
pub const SYSTEM_ENVIRONMENT_KEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// File holding the system-wide environment on other hosts.
pub const SYSTEM_ENVIRONMENT_FILE: &str = "/etc/environment";

/// A read-only source of named configuration values.
pub trait ConfigProvider {
    /// Human-readable description of where values come from.
    fn describe(&self) -> String;

    /// Look up a value. Absent or empty values are `ConfigurationMissing`.
    fn get(&self, name: &str) -> Result<String, PipelineError>;
}

/// Process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigProvider for ProcessEnv {
    fn describe(&self) -> String {
        "process environment".to_string()
    }

    fn get(&self, name: &str) -> Result<String, PipelineError> {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(PipelineError::missing(name, vec![self.describe()])),
        }
    }
}

#[derive(Debug, Clone)]
enum SystemStore {
    #[cfg(windows)]
    Registry(String),
    File(PathBuf),
}

/// The host's persistent, system-wide environment.
#[derive(Debug, Clone)]
pub struct SystemEnv {
    store: SystemStore,
}

impl SystemEnv {
    /// The platform's default system store.
    #[cfg(windows)]
    pub fn new() -> Self {
        SystemEnv {
            store: SystemStore::Registry(SYSTEM_ENVIRONMENT_KEY.to_string()),
        }
    }

    /// The platform's default system store.
    #[cfg(not(windows))]
    pub fn new() -> Self {
        Self::from_file(SYSTEM_ENVIRONMENT_FILE)
    }

    /// Read values from an `environment`-style file (`KEY=VALUE` lines).
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        SystemEnv {
            store: SystemStore::File(path.into()),
        }
    }
}

impl Default for SystemEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for SystemEnv {
    fn describe(&self) -> String {
        match &self.store {
            #[cfg(windows)]
            SystemStore::Registry(key) => format!(r"HKEY_LOCAL_MACHINE\{}", key),
            SystemStore::File(path) => path.display().to_string(),
        }
    }

    fn get(&self, name: &str) -> Result<String, PipelineError> {
        let value = match &self.store {
            #[cfg(windows)]
            SystemStore::Registry(key) => read_registry(key, name),
            SystemStore::File(path) => read_environment_file(path, name),
        };

        match value {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(PipelineError::missing(name, vec![self.describe()])),
        }
    }
}

#[cfg(windows)]
fn read_registry(key: &str, name: &str) -> Option<String> {
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ};
    use winreg::RegKey;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let env = match hklm.open_subkey_with_flags(key, KEY_READ) {
        Ok(env) => env,
        Err(e) => {
            tracing::debug!("cannot open registry key {}: {}", key, e);
            return None;
        }
    };
    env.get_value::<String, _>(name).ok()
}

fn read_environment_file(path: &Path, name: &str) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!("cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    parse_environment(&contents).remove(name)
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
///
/// A leading `export ` and one layer of matching quotes are stripped.
pub fn parse_environment(contents: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let value = value.trim();
        let value = ['"', '\'']
            .iter()
            .find_map(|q| {
                value
                    .strip_prefix(*q)
                    .and_then(|v| v.strip_suffix(*q))
            })
            .unwrap_or(value);

        values.insert(key.trim().to_string(), value.to_string());
    }

    values
}

/// In-memory values, for tests and for callers that already hold them.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
    label: String,
    values: HashMap<String, String>,
}

impl MemoryEnv {
    /// Create an empty store with the given description.
    pub fn new(label: impl Into<String>) -> Self {
        MemoryEnv {
            label: label.into(),
            values: HashMap::new(),
        }
    }

    /// Add a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl ConfigProvider for MemoryEnv {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn get(&self, name: &str) -> Result<String, PipelineError> {
        match self.values.get(name) {
            Some(value) if !value.is_empty() => Ok(value.clone()),
            _ => Err(PipelineError::missing(name, vec![self.describe()])),
        }
    }
}

/// Resolves values from a user-scope and a system-scope provider.
pub struct EnvResolver {
    user: Box<dyn ConfigProvider>,
    system: Box<dyn ConfigProvider>,
}

impl EnvResolver {
    /// Build a resolver from explicit backends.
    pub fn new(user: impl ConfigProvider + 'static, system: impl ConfigProvider + 'static) -> Self {
        EnvResolver {
            user: Box::new(user),
            system: Box::new(system),
        }
    }

    /// The host's real process environment and system store.
    pub fn host() -> Self {
        Self::new(ProcessEnv, SystemEnv::new())
    }

    /// Read a value from the process scope only.
    pub fn resolve_user(&self, name: &str) -> Result<String, PipelineError> {
        self.user.get(name)
    }

    /// Read a value from the system scope only.
    pub fn resolve_system(&self, name: &str) -> Result<String, PipelineError> {
        self.system.get(name)
    }

    /// Process scope first, then system scope.
    pub fn resolve(&self, name: &str) -> Result<String, PipelineError> {
        if let Ok(value) = self.resolve_user(name) {
            tracing::debug!("{} resolved from {}", name, self.user.describe());
            return Ok(value);
        }
        match self.resolve_system(name) {
            Ok(value) => {
                tracing::debug!("{} resolved from {}", name, self.system.describe());
                Ok(value)
            }
            Err(_) => Err(PipelineError::missing(
                name,
                vec![self.user.describe(), self.system.describe()],
            )),
        }
    }

    /// Resolve an SDK root and derive its `Include` directory.
    pub fn sdk_include_dir(&self, variable: &str) -> Result<PathBuf, PipelineError> {
        let root = self.resolve(variable)?;
        Ok(Path::new(&root).join("Include"))
    }
}

impl std::fmt::Debug for EnvResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvResolver")
            .field("user", &self.user.describe())
            .field("system", &self.system.describe())
            .finish()
    }
}
