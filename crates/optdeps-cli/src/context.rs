//! Project context detection
//!
//! Finds the project root from any directory below it and resolves the
//! effective settings.

use std::path::{Path, PathBuf};

use optdeps_core::{SETTINGS_FILENAME, Settings};

use crate::cli::Cli;
use crate::error::Result;

/// The project being operated on.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub settings: Settings,
}

impl ProjectContext {
    /// Resolve the project from `cwd`, applying command-line overrides.
    pub fn resolve(cwd: &Path, cli: &Cli) -> Result<Self> {
        let root = find_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
        let settings_path = cli
            .config
            .clone()
            .unwrap_or_else(|| root.join(SETTINGS_FILENAME));

        let mut settings = Settings::load(&settings_path)?;
        if let Some(manifest) = &cli.manifest {
            settings.manifest = manifest.clone();
        }
        if let Some(tool_key) = &cli.tool_key {
            settings.tool_key = tool_key.clone();
        }

        tracing::debug!(root = %root.display(), ?settings, "resolved project context");
        Ok(Self { root, settings })
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.settings.manifest_path(&self.root)
    }
}

/// Walk up from `cwd` looking for `optdeps.toml` or `composer.json`.
pub fn find_root(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| dir.join(SETTINGS_FILENAME).is_file() || dir.join("composer.json").is_file())
        .map(Path::to_path_buf)
}
