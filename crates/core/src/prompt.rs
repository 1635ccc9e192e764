//! Prompt engine
//!
//! Asks free text, multiple choice and yes/no questions through a
//! [`Console`]. Validated questions are re-asked until the validator accepts
//! an answer or the attempt ceiling is reached.

use crate::console::Console;
use crate::error::{Error, Result};
use crate::validate::RuleResult;

/// Attempts allowed for a validated question before the command aborts
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Prompt used when reading an answer on its own line
const ANSWER_PROMPT: &str = ">";

/// Question asking facade over a [`Console`]
pub struct PromptEngine<'a> {
    console: &'a mut dyn Console,
    max_attempts: usize,
}

impl<'a> PromptEngine<'a> {
    /// Create an engine with the default attempt ceiling
    pub fn new(console: &'a mut dyn Console) -> Self {
        Self {
            console,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the attempt ceiling (minimum 1)
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Current attempt ceiling
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Underlying console, for messages around questions
    pub fn console(&mut self) -> &mut dyn Console {
        &mut *self.console
    }

    /// Ask a free text question
    ///
    /// A non-empty `prompt` is shown as a question line first, the answer is
    /// then read on its own line.
    pub fn ask_free_text(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        if !prompt.is_empty() {
            self.console.question(prompt);
        }
        self.console.read_line(ANSWER_PROMPT, default)
    }

    /// Ask the user to pick one of `choices`
    ///
    /// Always returns the index of the selected choice.
    pub fn ask_choice(
        &mut self,
        prompt: &str,
        choices: &[String],
        default_index: usize,
    ) -> Result<usize> {
        if choices.is_empty() {
            return Err(Error::Message(format!("No choices available for '{prompt}'")));
        }
        let default_index = default_index.min(choices.len() - 1);
        self.console.select(prompt, choices, default_index)
    }

    /// Ask a yes/no question
    pub fn ask_confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        self.console.confirm(prompt, default)
    }

    /// Ask a question until `validator` accepts the answer
    ///
    /// Every rejection is reported on the console and the question is asked
    /// again. After `max_attempts` rejected answers the whole command is
    /// aborted with [`Error::TooManyAttempts`].
    pub fn ask_validated<F>(
        &mut self,
        field: &str,
        prompt: &str,
        default: Option<&str>,
        mut validator: F,
    ) -> Result<String>
    where
        F: FnMut(&str, &mut dyn Console) -> RuleResult,
    {
        if !prompt.is_empty() {
            self.console.question(prompt);
        }

        for attempt in 1..=self.max_attempts {
            let answer = self.console.read_line(ANSWER_PROMPT, default)?;
            match validator(&answer, &mut *self.console) {
                Ok(value) => return Ok(value),
                Err(rejection) => {
                    tracing::debug!(field, attempt, reason = %rejection, "Answer rejected");
                    self.console.error(&rejection.message);
                }
            }
        }

        Err(Error::TooManyAttempts {
            field: field.to_string(),
            attempts: self.max_attempts,
        })
    }
}
