//! Prompt channel abstraction.
//!
//! The engine talks to the user only through [`InteractionPort`]. The CLI
//! provides a terminal implementation; this module provides a scripted port
//! for tests and a defaults port for non-interactive runs.

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Notice shown when an answer is neither `y` nor `n`.
pub const INVALID_ANSWER: &str = "Invalid answer; please answer y or n";

/// A blocking question/answer channel.
pub trait InteractionPort {
    /// Ask a question and return the raw answer.
    ///
    /// `default` is the answer the front-end should assume for empty input.
    fn ask(&mut self, prompt: &str, default: &str) -> Result<String>;

    /// Show an informational message.
    fn notice(&mut self, message: &str);
}

impl<P: InteractionPort + ?Sized> InteractionPort for &mut P {
    fn ask(&mut self, prompt: &str, default: &str) -> Result<String> {
        (**self).ask(prompt, default)
    }

    fn notice(&mut self, message: &str) {
        (**self).notice(message)
    }
}

/// Ask a yes/no question until a valid answer is given.
///
/// Answers are trimmed and lower-cased; an empty answer means `default`.
/// Anything other than `y` or `n` re-issues the same prompt after an
/// [`INVALID_ANSWER`] notice.
pub fn ask_yes_no<P: InteractionPort + ?Sized>(
    port: &mut P,
    prompt: &str,
    default: &str,
) -> Result<bool> {
    loop {
        let raw = port.ask(prompt, default)?;
        let answer = raw.trim().to_lowercase();
        let answer = if answer.is_empty() {
            default.to_lowercase()
        } else {
            answer
        };

        match answer.as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => {
                tracing::debug!(answer = %raw, "rejected answer");
                port.notice(INVALID_ANSWER);
            }
        }
    }
}

/// A port fed from a finite queue of answers.
///
/// Every prompt and notice is recorded. When the queue is empty, `ask`
/// returns [`Error::ExhaustedInput`].
#[derive(Debug, Default)]
pub struct ScriptedPort {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    notices: Vec<String>,
}

impl ScriptedPort {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Prompts issued so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Notices shown so far, in order.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl InteractionPort for ScriptedPort {
    fn ask(&mut self, prompt: &str, _default: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| Error::ExhaustedInput {
            prompt: prompt.to_string(),
        })
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// A port that accepts the default answer for every prompt.
///
/// Notices are forwarded to the log.
#[derive(Debug, Default)]
pub struct DefaultsPort;

impl InteractionPort for DefaultsPort {
    fn ask(&mut self, prompt: &str, default: &str) -> Result<String> {
        tracing::info!(prompt, default, "answering with default");
        Ok(default.to_string())
    }

    fn notice(&mut self, message: &str) {
        tracing::info!("{message}");
    }
}
