//! Shell-command backed installer and configuration hook.
//!
//! The installer command receives the selected package names as trailing
//! arguments. The patched manifest is not yet on disk when the installer
//! runs, so it is staged as a temp file next to the real manifest and its
//! path exported in `OPTDEPS_MANIFEST` and in the variable named by
//! `installer.manifest_env` (`COMPOSER` by default, which composer reads in
//! place of `composer.json`).
//!
//! Composer writes its lock file beside the manifest it was given. The real
//! lock file is copied next to the staged manifest before the run and moved
//! back once the install succeeded, so `composer.lock` follows the manifest.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::manifest::{ManifestDocument, ManifestView};
use crate::notifier::{Configurator, InstalledPackage, Installer};

/// Build a shell [`Command`] that executes `cmd_str` via the system shell.
///
/// - Unix: `sh -c "{cmd_str}"`
/// - Windows: `cmd /C "{cmd_str}"`
fn shell_command(cmd_str: &str) -> Command {
    #[cfg(windows)]
    {
        let mut c = Command::new("cmd");
        c.args(["/C", cmd_str]);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_str);
        c
    }
}

/// The lock file composer pairs with `manifest`.
fn lock_path(manifest: &Path) -> PathBuf {
    manifest.with_extension("lock")
}

/// A patched manifest staged for the installer, plus its lock file.
///
/// Both files are removed on drop unless the lock was committed.
struct StagedManifest {
    file: NamedTempFile,
    lock: PathBuf,
}

impl StagedManifest {
    fn path(&self) -> &Path {
        self.file.path()
    }

    /// Move the staged lock file over `target`, if the installer left one.
    fn commit_lock(&self, target: &Path) -> Result<()> {
        if !self.lock.exists() {
            return Ok(());
        }
        fs::rename(&self.lock, target).map_err(|e| Error::io(target, e))?;
        tracing::info!(path = %target.display(), "updated lock file");
        Ok(())
    }
}

impl Drop for StagedManifest {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock);
    }
}

/// Runs the host package manager through the shell.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    command: String,
    root: PathBuf,
    document: ManifestDocument,
    vendor_dir: String,
    manifest_env: Option<String>,
}

impl CommandInstaller {
    /// An installer running `command` in `root` for the manifest `document`.
    ///
    /// The vendor directory defaults to the manifest's `config.vendor-dir`.
    pub fn new(
        command: impl Into<String>,
        root: impl Into<PathBuf>,
        document: ManifestDocument,
    ) -> Self {
        Self {
            command: command.into(),
            root: root.into(),
            vendor_dir: document.view().vendor_dir().to_string(),
            document,
            manifest_env: None,
        }
    }

    /// Build from settings. The vendor directory comes from the settings
    /// when set, otherwise from the manifest.
    pub fn from_settings(settings: &Settings, root: &Path, document: &ManifestDocument) -> Self {
        let installer = Self::new(&settings.installer.command, root, document.clone())
            .with_manifest_env(settings.installer.manifest_env.clone());
        match &settings.vendor_dir {
            Some(vendor_dir) => installer.with_vendor_dir(vendor_dir),
            None => installer,
        }
    }

    pub fn with_vendor_dir(mut self, vendor_dir: impl Into<String>) -> Self {
        self.vendor_dir = vendor_dir.into();
        self
    }

    /// Export the staged manifest path in `name` too. Empty disables it.
    pub fn with_manifest_env(mut self, name: Option<String>) -> Self {
        self.manifest_env = name.filter(|name| !name.is_empty());
        self
    }

    /// Write `manifest` to a temp file beside the real manifest, rendered
    /// exactly as it will be saved, and seed its lock file.
    fn stage(&self, manifest: &ManifestView) -> Result<StagedManifest> {
        let dir = self
            .document
            .path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(&self.root);

        let mut file = tempfile::Builder::new()
            .prefix(".optdeps-")
            .suffix(".json")
            .tempfile_in(dir)
            .map_err(|e| Error::io(dir, e))?;

        let content = self.document.render(manifest)?;
        file.write_all(content.as_bytes())
            .map_err(|e| Error::io(file.path(), e))?;

        let staged = StagedManifest {
            lock: lock_path(file.path()),
            file,
        };
        let real_lock = lock_path(self.document.path());
        if real_lock.is_file() {
            fs::copy(&real_lock, &staged.lock).map_err(|e| Error::io(&staged.lock, e))?;
        }
        tracing::debug!(path = %staged.path().display(), "staged patched manifest");
        Ok(staged)
    }
}

impl Installer for CommandInstaller {
    fn install(&mut self, manifest: &ManifestView, whitelist: &[String]) -> Result<i32> {
        let staged = self.stage(manifest)?;
        let cmd_str = format!("{} {}", self.command, whitelist.join(" "));

        let mut cmd = shell_command(&cmd_str);
        cmd.current_dir(&self.root)
            .env("OPTDEPS_MANIFEST", staged.path())
            .env("OPTDEPS_PACKAGES", whitelist.join(" "))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(name) = &self.manifest_env {
            cmd.env(name, staged.path());
        }

        tracing::info!(command = %cmd_str, "running installer");
        let status = cmd.status().map_err(|source| Error::InstallerSpawn {
            command: cmd_str.clone(),
            source,
        })?;

        // terminated by a signal
        let code = status.code().unwrap_or(-1);
        if code != 0 {
            return Ok(code);
        }

        let missing: Vec<String> = whitelist
            .iter()
            .filter(|name| self.installed_path(name).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::InstallIncomplete {
                packages: missing,
                vendor_dir: self.root.join(&self.vendor_dir),
            });
        }

        staged.commit_lock(&lock_path(self.document.path()))?;
        Ok(0)
    }

    fn installed_path(&self, name: &str) -> Option<PathBuf> {
        let path = self.root.join(&self.vendor_dir).join(name);
        path.is_dir().then_some(path)
    }
}

/// Runs a shell hook once per installed package.
///
/// The hook sees `OPTDEPS_PACKAGE_NAME`, `OPTDEPS_PACKAGE_PATH`,
/// `OPTDEPS_PACKAGE_DEV` and `OPTDEPS_PACKAGE_MODULE`.
#[derive(Debug, Clone)]
pub struct CommandConfigurator {
    command: Option<String>,
    root: PathBuf,
}

impl CommandConfigurator {
    pub fn new(command: Option<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }
}

impl Configurator for CommandConfigurator {
    fn configure(&mut self, package: &InstalledPackage) {
        let Some(command) = &self.command else {
            tracing::debug!(package = %package.name, "no configuration hook configured");
            return;
        };

        let result = shell_command(command)
            .current_dir(&self.root)
            .env("OPTDEPS_PACKAGE_NAME", &package.name)
            .env("OPTDEPS_PACKAGE_PATH", &package.install_path)
            .env("OPTDEPS_PACKAGE_DEV", package.dev.to_string())
            .env("OPTDEPS_PACKAGE_MODULE", package.module.to_string())
            .status();

        match result {
            Ok(status) if status.success() => {
                tracing::info!(package = %package.name, "configured package");
            }
            Ok(status) => {
                tracing::warn!(package = %package.name, %status, "configuration hook failed");
            }
            Err(e) => {
                tracing::warn!(package = %package.name, "could not run configuration hook: {e}");
            }
        }
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    /// Creates `vendor/<name>` for every name appended to the command.
    const FAKE_INSTALL: &str = "mkdir -p vendor && cd vendor && mkdir -p";

    fn document(tmp: &TempDir) -> ManifestDocument {
        ManifestDocument::from_source(
            tmp.path().join("composer.json"),
            "{\n    \"require\": {\n        \"x/a\": \"^1.0\"\n    }\n}\n",
        )
        .unwrap()
    }

    fn patched(doc: &ManifestDocument) -> ManifestView {
        let mut view = doc.view().clone();
        view.set_requirement(false, "x/b", "^2.0");
        view
    }

    fn staged_leftovers(tmp: &TempDir) -> Vec<String> {
        fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".optdeps-"))
            .collect()
    }

    #[test]
    fn test_install_success() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        let mut installer = CommandInstaller::new(FAKE_INSTALL, tmp.path(), doc.clone());
        let status = installer.install(doc.view(), &["x/a".to_string()]).unwrap();
        assert_eq!(status, 0);
        assert!(tmp.path().join("vendor/x/a").is_dir());
    }

    #[test]
    fn test_install_reports_nonzero_status() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        let mut installer = CommandInstaller::new("exit 3;", tmp.path(), doc.clone());
        let status = installer.install(doc.view(), &["x/a".to_string()]).unwrap();
        assert_eq!(status, 3);
        assert!(staged_leftovers(&tmp).is_empty());
    }

    #[test]
    fn test_missing_package_after_success_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        let mut installer = CommandInstaller::new("true", tmp.path(), doc.clone());

        let err = installer
            .install(doc.view(), &["x/a".to_string()])
            .unwrap_err();
        assert!(
            matches!(err, Error::InstallIncomplete { ref packages, .. } if packages == &["x/a"]),
            "got: {err:?}"
        );
    }

    #[test]
    fn test_staged_manifest_matches_saved_rendering() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        let view = patched(&doc);
        let mut installer = CommandInstaller::new(
            r#"cp "$OPTDEPS_MANIFEST" staged.json && printf '%s' "$OPTDEPS_PACKAGES" > packages.txt && mkdir -p vendor/x/a vendor/x/b && true"#,
            tmp.path(),
            doc.clone(),
        );
        let whitelist = vec!["x/a".to_string(), "x/b".to_string()];
        assert_eq!(installer.install(&view, &whitelist).unwrap(), 0);

        assert_eq!(
            fs::read_to_string(tmp.path().join("staged.json")).unwrap(),
            doc.render(&view).unwrap()
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join("packages.txt")).unwrap(),
            "x/a x/b"
        );
        assert!(staged_leftovers(&tmp).is_empty(), "staged manifest left behind");
    }

    #[test]
    fn test_default_settings_point_composer_at_staged_manifest() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        let mut settings = Settings::default();
        // composer reads $COMPOSER, falling back to composer.json
        settings.installer.command = format!(
            r#"grep -qF '"x/b": "^2.0"' "${{COMPOSER:-composer.json}}" && {FAKE_INSTALL}"#
        );

        let mut installer = CommandInstaller::from_settings(&settings, tmp.path(), &doc);
        let status = installer
            .install(&patched(&doc), &["x/b".to_string()])
            .unwrap();
        assert_eq!(status, 0);
    }

    #[test]
    fn test_empty_manifest_env_disables_export() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        let mut installer = CommandInstaller::new(
            r#"test -z "$COMPOSER" && mkdir -p vendor/x/a && true"#,
            tmp.path(),
            doc.clone(),
        )
        .with_manifest_env(Some(String::new()));
        assert_eq!(installer.install(doc.view(), &["x/a".to_string()]).unwrap(), 0);
    }

    #[test]
    fn test_lock_file_follows_successful_install() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        fs::write(tmp.path().join("composer.lock"), "old\n").unwrap();

        let mut installer = CommandInstaller::new(
            r#"test "$(cat "${COMPOSER%.json}.lock")" = old && echo new > "${COMPOSER%.json}.lock" && mkdir -p vendor/x/a && true"#,
            tmp.path(),
            doc.clone(),
        )
        .with_manifest_env(Some("COMPOSER".to_string()));
        assert_eq!(installer.install(doc.view(), &["x/a".to_string()]).unwrap(), 0);

        assert_eq!(
            fs::read_to_string(tmp.path().join("composer.lock")).unwrap(),
            "new\n"
        );
        assert!(staged_leftovers(&tmp).is_empty());
    }

    #[test]
    fn test_lock_file_untouched_when_install_fails() {
        let tmp = TempDir::new().unwrap();
        let doc = document(&tmp);
        fs::write(tmp.path().join("composer.lock"), "old\n").unwrap();

        let mut installer = CommandInstaller::new(
            r#"echo new > "${COMPOSER%.json}.lock"; exit 1;"#,
            tmp.path(),
            doc.clone(),
        )
        .with_manifest_env(Some("COMPOSER".to_string()));
        assert_eq!(installer.install(doc.view(), &["x/a".to_string()]).unwrap(), 1);

        assert_eq!(
            fs::read_to_string(tmp.path().join("composer.lock")).unwrap(),
            "old\n"
        );
        assert!(staged_leftovers(&tmp).is_empty());
    }

    #[test]
    fn test_installed_path() {
        let tmp = TempDir::new().unwrap();
        let installer =
            CommandInstaller::new("true", tmp.path(), document(&tmp)).with_vendor_dir("lib");
        assert_eq!(installer.installed_path("x/a"), None);

        fs::create_dir_all(tmp.path().join("lib/x/a")).unwrap();
        assert_eq!(
            installer.installed_path("x/a"),
            Some(tmp.path().join("lib/x/a"))
        );
    }

    #[test]
    fn test_from_settings_prefers_settings_vendor_dir() {
        let tmp = TempDir::new().unwrap();
        let doc = ManifestDocument::from_source(
            tmp.path().join("composer.json"),
            json!({"config": {"vendor-dir": "deps"}}).to_string(),
        )
        .unwrap();

        let installer = CommandInstaller::from_settings(&Settings::default(), tmp.path(), &doc);
        assert_eq!(installer.vendor_dir, "deps");
        assert_eq!(installer.manifest_env.as_deref(), Some("COMPOSER"));

        let settings = Settings {
            vendor_dir: Some("lib".to_string()),
            ..Settings::default()
        };
        let installer = CommandInstaller::from_settings(&settings, tmp.path(), &doc);
        assert_eq!(installer.vendor_dir, "lib");
    }

    #[test]
    fn test_configurator_runs_hook() {
        let tmp = TempDir::new().unwrap();
        let mut configurator = CommandConfigurator::new(
            Some(r#"printf '%s|%s' "$OPTDEPS_PACKAGE_NAME" "$OPTDEPS_PACKAGE_MODULE" > hook.txt"#.to_string()),
            tmp.path(),
        );
        configurator.configure(&InstalledPackage {
            name: "x/a".to_string(),
            install_path: tmp.path().join("vendor/x/a"),
            dev: false,
            module: true,
        });
        assert_eq!(
            fs::read_to_string(tmp.path().join("hook.txt")).unwrap(),
            "x/a|true"
        );
    }

    #[test]
    fn test_configurator_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut configurator = CommandConfigurator::new(Some("exit 1".to_string()), tmp.path());
        configurator.configure(&InstalledPackage {
            name: "x/a".to_string(),
            install_path: tmp.path().to_path_buf(),
            dev: false,
            module: false,
        });
    }
}
