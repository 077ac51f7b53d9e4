//! Selection of optional packages.
//!
//! The engine validates the declarations, offers a one-step minimal install,
//! and otherwise walks the remaining packages in declaration order asking the
//! user about each one.

use serde_json::Value;

use crate::error::Result;
use crate::interaction::{InteractionPort, ask_yes_no};
use crate::package::OptionalPackage;
use crate::selection::Selection;
use crate::spec::is_valid_spec;

pub const MINIMAL_PROMPT: &str = "Do you want a minimal install (no optional packages)?";
pub const NOTHING_SELECTED: &str = "No optional packages selected to install";
pub const DEV_MODULE_HINT: &str =
    "When prompted to install as a module, select development.config.php.dist";
pub const APP_MODULE_HINT: &str =
    "When prompted to install as a module, select application.config.php or modules.config.php";

/// How a selection run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// No valid declarations; nothing was asked.
    NoCandidates,
    /// The user chose a minimal install.
    Minimal,
    /// The user declined every package.
    NothingSelected,
    /// At least one package was chosen.
    Selected(Selection),
}

impl SelectionOutcome {
    /// Whether the declaration block should be removed without installing.
    pub fn is_minimal(&self) -> bool {
        matches!(self, Self::Minimal | Self::NothingSelected)
    }

    /// The chosen packages; empty for every outcome but `Selected`.
    pub fn selection(&self) -> Selection {
        match self {
            Self::Selected(selection) => selection.clone(),
            _ => Selection::new(),
        }
    }
}

/// Validate raw declarations, dropping invalid ones.
///
/// Order is preserved.
pub fn validated_packages(declarations: &[Value]) -> Vec<OptionalPackage> {
    declarations
        .iter()
        .filter(|d| is_valid_spec(d))
        .filter_map(|d| match OptionalPackage::from_declaration(d) {
            Ok(package) => Some(package),
            Err(e) => {
                tracing::debug!("excluding declaration: {e}");
                None
            }
        })
        .collect()
}

/// Drives the minimal-install question and the per-package prompts.
pub struct SelectionEngine<P> {
    port: P,
}

impl<P: InteractionPort> SelectionEngine<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Run the prompt sequence over `declarations`.
    pub fn select(&mut self, declarations: &[Value]) -> Result<SelectionOutcome> {
        let packages = validated_packages(declarations);
        tracing::debug!(
            declared = declarations.len(),
            valid = packages.len(),
            "validated optional package declarations"
        );

        if packages.is_empty() {
            return Ok(SelectionOutcome::NoCandidates);
        }

        if ask_yes_no(&mut self.port, MINIMAL_PROMPT, "y")? {
            tracing::info!("minimal install chosen");
            return Ok(SelectionOutcome::Minimal);
        }

        let mut selection = Selection::new();
        for package in packages {
            if ask_yes_no(&mut self.port, &render_prompt(&package), "n")? {
                self.port.notice(&format!(
                    "Will install {} ({})",
                    package.name(),
                    package.constraint()
                ));
                selection.push(package);
            }
        }

        if selection.is_empty() {
            self.port.notice(NOTHING_SELECTED);
            return Ok(SelectionOutcome::NothingSelected);
        }

        Ok(SelectionOutcome::Selected(selection))
    }
}

/// The full prompt for a package, including the module hint.
pub fn render_prompt(package: &OptionalPackage) -> String {
    let prompt = package.prompt();
    if !package.is_module() {
        return prompt;
    }
    let hint = if package.is_dev() {
        DEV_MODULE_HINT
    } else {
        APP_MODULE_HINT
    };
    format!("{prompt}\n{hint}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ScriptedPort;
    use serde_json::json;

    fn declarations() -> Vec<Value> {
        vec![
            json!({"name": "x/a", "constraint": "^1.0"}),
            json!({"name": "x/b", "constraint": "^2.0", "dev": true}),
        ]
    }

    #[test]
    fn test_no_candidates_asks_nothing() {
        let mut engine = SelectionEngine::new(ScriptedPort::new(Vec::<String>::new()));
        let outcome = engine
            .select(&[json!({"name": "x/a"}), json!({"constraint": "^1.0"})])
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::NoCandidates);
        assert!(engine.port().prompts().is_empty());
    }

    #[test]
    fn test_minimal_install() {
        let mut engine = SelectionEngine::new(ScriptedPort::new(["y"]));
        let outcome = engine.select(&declarations()).unwrap();
        assert_eq!(outcome, SelectionOutcome::Minimal);
        assert!(outcome.is_minimal());
        assert_eq!(engine.port().prompts(), [MINIMAL_PROMPT]);
    }

    #[test]
    fn test_default_answer_is_minimal() {
        let mut engine = SelectionEngine::new(ScriptedPort::new([""]));
        assert_eq!(
            engine.select(&declarations()).unwrap(),
            SelectionOutcome::Minimal
        );
    }

    #[test]
    fn test_nothing_selected() {
        let mut engine = SelectionEngine::new(ScriptedPort::new(["n", "n", ""]));
        let outcome = engine.select(&declarations()).unwrap();
        assert_eq!(outcome, SelectionOutcome::NothingSelected);
        assert!(outcome.selection().is_empty());
        assert_eq!(engine.port().notices(), [NOTHING_SELECTED]);
    }

    #[test]
    fn test_selection_notices() {
        let mut engine = SelectionEngine::new(ScriptedPort::new(["n", "y", "n"]));
        let outcome = engine.select(&declarations()).unwrap();
        assert_eq!(outcome.selection().whitelist(), vec!["x/a"]);
        assert_eq!(engine.port().notices(), ["Will install x/a (^1.0)"]);
    }

    #[test]
    fn test_module_hints() {
        let app = OptionalPackage::new("x/app", "^1.0").unwrap().module(true);
        let dev = app.clone().dev(true);
        let plain = OptionalPackage::new("x/plain", "^1.0").unwrap();

        assert_eq!(
            render_prompt(&app),
            format!("Install x/app (^1.0)?\n{APP_MODULE_HINT}")
        );
        assert_eq!(
            render_prompt(&dev),
            format!("Install x/app (^1.0)?\n{DEV_MODULE_HINT}")
        );
        assert_eq!(render_prompt(&plain), "Install x/plain (^1.0)?");
    }
}
