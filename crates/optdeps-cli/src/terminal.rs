//! Terminal prompt port backed by dialoguer.

use colored::Colorize;
use console::Term;
use dialoguer::Input;
use optdeps_core::{Error, InteractionPort, Result};

/// Reads free-text answers from the terminal.
///
/// Multi-line prompts print every line but the first as a hint above the
/// input line. Hints go to stderr, where dialoguer draws the prompt.
#[derive(Debug, Default)]
pub struct TerminalPort;

/// The question line and the hint lines that follow it.
fn split_prompt(prompt: &str) -> (&str, Vec<&str>) {
    let mut lines = prompt.lines();
    let question = lines.next().unwrap_or_default();
    (question, lines.collect())
}

impl InteractionPort for TerminalPort {
    fn ask(&mut self, prompt: &str, default: &str) -> Result<String> {
        let (question, hints) = split_prompt(prompt);
        let term = Term::stderr();
        for hint in hints {
            term.write_line(&format!("    {}", hint.dimmed()))
                .map_err(|e| Error::Prompt(e.to_string()))?;
        }

        let choices = if default.eq_ignore_ascii_case("y") {
            "Y/n"
        } else {
            "y/N"
        };

        Input::<String>::new()
            .with_prompt(format!("{question} [{choices}]"))
            .allow_empty(true)
            .interact_text_on(&term)
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn notice(&mut self, message: &str) {
        println!("{}", message.green());
    }
}
