#![allow(dead_code)]

use std::path::PathBuf;

use optdeps_core::{Configurator, InstalledPackage, Installer, ManifestView, Result};

/// Records installer calls and returns a fixed status.
#[derive(Debug)]
pub struct FakeInstaller {
    pub status: i32,
    pub calls: Vec<(ManifestView, Vec<String>)>,
    vendor: PathBuf,
    missing: Vec<String>,
}

impl FakeInstaller {
    pub fn succeeding() -> Self {
        Self::with_status(0)
    }

    pub fn with_status(status: i32) -> Self {
        Self {
            status,
            calls: Vec::new(),
            vendor: PathBuf::from("/project/vendor"),
            missing: Vec::new(),
        }
    }

    /// Report `name` as absent from disk after installing.
    pub fn without_path_for(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }
}

impl Installer for FakeInstaller {
    fn install(&mut self, manifest: &ManifestView, whitelist: &[String]) -> Result<i32> {
        self.calls.push((manifest.clone(), whitelist.to_vec()));
        Ok(self.status)
    }

    fn installed_path(&self, name: &str) -> Option<PathBuf> {
        if self.missing.iter().any(|missing| missing == name) {
            return None;
        }
        Some(self.vendor.join(name))
    }
}

/// Records every package it is asked to configure.
#[derive(Debug, Default)]
pub struct RecordingConfigurator {
    pub configured: Vec<InstalledPackage>,
}

impl Configurator for RecordingConfigurator {
    fn configure(&mut self, package: &InstalledPackage) {
        self.configured.push(package.clone());
    }
}
