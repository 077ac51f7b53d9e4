//! Hand-off of a selection to the installer and the configuration hook.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::manifest::ManifestView;
use crate::selection::Selection;

/// Fetches and locks the selected packages.
pub trait Installer {
    /// Install the packages in `whitelist` using the requirements in
    /// `manifest`, touching no other dependency.
    ///
    /// Returns the installer's exit status; `0` means success.
    fn install(&mut self, manifest: &ManifestView, whitelist: &[String]) -> Result<i32>;

    /// Where an installed package lives on disk, if it can be found.
    fn installed_path(&self, name: &str) -> Option<PathBuf>;
}

/// An installed package as seen by the configuration hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub install_path: PathBuf,
    pub dev: bool,
    pub module: bool,
}

/// Registers installed packages with the application configuration.
pub trait Configurator {
    /// Called once per installed package. Failures are the hook's business.
    fn configure(&mut self, package: &InstalledPackage);
}

/// A configurator that does nothing.
#[derive(Debug, Default)]
pub struct NoopConfigurator;

impl Configurator for NoopConfigurator {
    fn configure(&mut self, package: &InstalledPackage) {
        tracing::debug!(package = %package.name, "no configuration hook; skipping");
    }
}

/// Runs the installer, then the configuration hook for each package.
pub struct DownstreamNotifier<I, C> {
    installer: I,
    configurator: C,
}

impl<I: Installer, C: Configurator> DownstreamNotifier<I, C> {
    pub fn new(installer: I, configurator: C) -> Self {
        Self {
            installer,
            configurator,
        }
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    pub fn configurator(&self) -> &C {
        &self.configurator
    }

    /// Install `selection` against the patched `manifest` and configure the
    /// results.
    ///
    /// A non-zero installer status returns [`Error::Install`] and the
    /// configurator is never called.
    pub fn notify(&mut self, selection: &Selection, manifest: &ManifestView) -> Result<()> {
        let whitelist = selection.whitelist();
        tracing::info!(packages = ?whitelist, "running installer");

        let status = self.installer.install(manifest, &whitelist)?;
        if status != 0 {
            return Err(Error::Install {
                status,
                packages: whitelist,
            });
        }

        for package in selection {
            let Some(install_path) = self.installer.installed_path(package.name()) else {
                tracing::warn!(
                    package = package.name(),
                    "installed package not found on disk; skipping configuration"
                );
                continue;
            };
            self.configurator.configure(&InstalledPackage {
                name: package.name().to_string(),
                install_path,
                dev: package.is_dev(),
                module: package.is_module(),
            });
        }

        Ok(())
    }
}
