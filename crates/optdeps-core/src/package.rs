//! Validated optional packages.

use serde::Serialize;
use serde_json::Value;

use crate::constraint::VersionConstraint;
use crate::error::{Error, Result};
use crate::spec::{is_valid_package_name, is_valid_spec, non_empty_str};

/// An optional package the user may choose to install.
///
/// Built from a declaration in the manifest's `extra.<tool-key>` array:
///
/// ```json
/// {
///     "name": "zendframework/zend-db",
///     "constraint": "^2.8.1",
///     "prompt": "Would you like to use the database adapter?",
///     "module": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionalPackage {
    name: String,
    constraint: String,
    dev: bool,
    module: bool,
    prompt: Option<String>,
}

impl OptionalPackage {
    /// Create a runtime, non-module package with the default prompt.
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Result<Self> {
        let package = Self {
            name: name.into(),
            constraint: constraint.into(),
            dev: false,
            module: false,
            prompt: None,
        };
        package.validate()?;
        Ok(package)
    }

    /// Build a package from a raw declaration.
    ///
    /// Returns [`Error::InvalidSpec`] for anything [`is_valid_spec`] rejects,
    /// for names outside the package name grammar, for unparseable
    /// constraints, and for optional fields of the wrong type.
    pub fn from_declaration(declaration: &Value) -> Result<Self> {
        let label = non_empty_str(declaration, "name").unwrap_or("<unnamed>");
        if !is_valid_spec(declaration) {
            return Err(Error::invalid_spec(
                label,
                "'name' and 'constraint' must be non-empty strings",
            ));
        }

        let package = Self {
            name: label.to_string(),
            constraint: non_empty_str(declaration, "constraint")
                .unwrap_or_default()
                .to_string(),
            dev: optional_bool(declaration, "dev", label)?,
            module: optional_bool(declaration, "module", label)?,
            prompt: optional_prompt(declaration, label)?,
        };
        package.validate()?;
        Ok(package)
    }

    /// Mark the package as a development requirement.
    pub fn dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    /// Mark the package as needing registration in application configuration.
    pub fn module(mut self, module: bool) -> Self {
        self.module = module;
        self
    }

    /// Replace the default prompt text.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into()).filter(|p| !p.is_empty());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> &str {
        &self.constraint
    }

    pub fn is_dev(&self) -> bool {
        self.dev
    }

    pub fn is_module(&self) -> bool {
        self.module
    }

    /// The question shown to the user.
    ///
    /// Defaults to `Install {name} ({constraint})?`.
    pub fn prompt(&self) -> String {
        match &self.prompt {
            Some(prompt) => prompt.clone(),
            None => format!("Install {} ({})?", self.name, self.constraint),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.chars().any(char::is_whitespace) {
            return Err(Error::invalid_spec(&self.name, "name must not contain whitespace"));
        }
        if !is_valid_package_name(&self.name) {
            return Err(Error::invalid_spec(
                &self.name,
                "name must be a single token or 'vendor/name'",
            ));
        }
        VersionConstraint::parse(&self.constraint)
            .map_err(|e| Error::invalid_spec(&self.name, e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Display for OptionalPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.constraint)
    }
}

fn optional_bool(declaration: &Value, key: &str, label: &str) -> Result<bool> {
    match declaration.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(Error::invalid_spec(
            label,
            format!("'{key}' must be a boolean, got {other}"),
        )),
    }
}

fn optional_prompt(declaration: &Value, label: &str) -> Result<Option<String>> {
    match declaration.get("prompt") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::invalid_spec(
            label,
            format!("'prompt' must be a string, got {other}"),
        )),
    }
}
