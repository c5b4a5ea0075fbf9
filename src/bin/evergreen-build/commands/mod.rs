//! Command implementations

pub mod generate;
pub mod plan;
pub mod setup;

use std::path::Path;

use anyhow::Result;
use evergreen_build::project::ProjectLayout;
use evergreen_build::util::config::{global_config_path, load_config, CONFIG_FILE_NAME};
use evergreen_build::util::Config;

/// State shared by every command: where the project is and how it is
/// configured.
pub struct Context {
    pub layout: ProjectLayout,
    pub config: Config,
    /// Whether diagnostics may use ANSI colors
    pub color: bool,
}

impl Context {
    pub fn new(root: Option<&Path>, color: bool) -> Result<Self> {
        let layout = match root {
            Some(root) => ProjectLayout::new(root)?,
            None => ProjectLayout::from_cwd()?,
        };

        let global = global_config_path();
        let config = load_config(
            global.as_deref(),
            &layout.config_dir().join(CONFIG_FILE_NAME),
        );
        tracing::debug!("project root: {}", layout.root().display());

        Ok(Context {
            layout,
            config,
            color,
        })
    }
}
