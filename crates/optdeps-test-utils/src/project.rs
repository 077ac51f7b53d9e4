//! [`TestProject`] builder for optdeps test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Tool key used by the fixtures.
pub const TOOL_KEY: &str = "optional-packages";

/// Three declarations: a runtime module, a dev module and a plain package.
pub fn sample_declarations() -> Value {
    json!([
        {
            "name": "zendframework/zend-db",
            "constraint": "^2.8.1",
            "prompt": "Would you like to use the database adapter?",
            "module": true
        },
        {
            "name": "zendframework/zend-developer-tools",
            "constraint": "^1.1.0",
            "prompt": "Would you like to install the developer toolbar?",
            "module": true,
            "dev": true
        },
        {
            "name": "zendframework/zend-cache",
            "constraint": "^2.7.1"
        }
    ])
}

/// A temporary project directory with helper methods for test setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use optdeps_test_utils::{TestProject, sample_declarations};
///
/// let project = TestProject::new();
/// project.write_manifest_with_declarations(sample_declarations());
/// project.assert_file_exists("composer.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of `composer.json` in the project.
    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("composer.json")
    }

    /// Write `composer.json` with four-space indentation and a trailing
    /// newline.
    pub fn write_manifest(&self, manifest: &Value) {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(manifest, &mut serializer).unwrap();
        buf.push(b'\n');
        fs::write(self.manifest_path(), buf).unwrap();
    }

    /// Write a skeleton manifest carrying `declarations` under
    /// `extra.optional-packages`.
    pub fn write_manifest_with_declarations(&self, declarations: Value) {
        self.write_manifest(&json!({
            "name": "acme/skeleton",
            "description": "Application skeleton",
            "type": "project",
            "require": {
                "php": "^7.1",
                "zendframework/zend-mvc": "^3.1"
            },
            "extra": {
                TOOL_KEY: declarations
            },
            "scripts": {
                "test": "phpunit"
            }
        }));
    }

    /// Write `optdeps.toml` in the project root.
    pub fn write_settings(&self, content: &str) {
        fs::write(self.root().join("optdeps.toml"), content).unwrap();
    }

    /// Raw manifest text.
    pub fn read_manifest_text(&self) -> String {
        fs::read_to_string(self.manifest_path()).unwrap()
    }

    /// Parsed manifest.
    pub fn read_manifest(&self) -> Value {
        serde_json::from_str(&self.read_manifest_text()).unwrap()
    }

    /// Assert that `path` (relative to the project root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
