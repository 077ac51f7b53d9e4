//! Settings from `optdeps.toml`.
//!
//! # Example TOML
//!
//! ```toml
//! tool_key = "optional-packages"
//! manifest = "composer.json"
//!
//! [installer]
//! command = "composer update"
//! manifest_env = "COMPOSER"
//!
//! [configure]
//! command = "vendor/bin/register-module"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The canonical settings filename, looked up in the project root.
pub const SETTINGS_FILENAME: &str = "optdeps.toml";

fn default_tool_key() -> String {
    "optional-packages".to_string()
}

fn default_manifest() -> PathBuf {
    PathBuf::from("composer.json")
}

fn default_installer_command() -> String {
    "composer update".to_string()
}

fn default_manifest_env() -> Option<String> {
    Some("COMPOSER".to_string())
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Key under the manifest's `extra` node holding the declarations.
    #[serde(default = "default_tool_key")]
    pub tool_key: String,
    /// Manifest path, relative to the project root.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    /// Overrides the manifest's `config.vendor-dir`.
    #[serde(default)]
    pub vendor_dir: Option<String>,
    #[serde(default)]
    pub installer: InstallerSettings,
    #[serde(default)]
    pub configure: ConfigureSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool_key: default_tool_key(),
            manifest: default_manifest(),
            vendor_dir: None,
            installer: InstallerSettings::default(),
            configure: ConfigureSettings::default(),
        }
    }
}

/// How the installer is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerSettings {
    /// Shell command; the selected package names are appended.
    #[serde(default = "default_installer_command")]
    pub command: String,
    /// Environment variable that receives the staged manifest path. An
    /// empty name disables it.
    #[serde(default = "default_manifest_env")]
    pub manifest_env: Option<String>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            command: default_installer_command(),
            manifest_env: default_manifest_env(),
        }
    }
}

/// Optional per-package configuration hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigureSettings {
    #[serde(default)]
    pub command: Option<String>,
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Absolute manifest path for a project rooted at `root`.
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }
}
