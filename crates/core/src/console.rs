//! Console abstraction
//!
//! Every message and every question a command shows goes through a
//! [`Console`], so formatting stays consistent and commands can be driven
//! without a terminal. The terminal implementation lives in the CLI crate;
//! [`ScriptedConsole`] is an in-memory implementation fed with prepared
//! answers.

use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Visual tone of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Unstyled text
    Plain,
    /// Section heading
    Title,
    /// Informational message
    Info,
    /// Secondary, dimmed text
    Comment,
    /// Text introducing a question
    Question,
    /// Operation succeeded
    Success,
    /// Something the user should look at
    Warning,
    /// Operation failed
    Error,
    /// Side note
    Note,
    /// Verbose diagnostics
    Debug,
}

impl Tone {
    /// Label printed in front of the first line of a message
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Plain | Self::Title => None,
            Self::Info => Some("INFO"),
            Self::Comment => Some("COMMENT"),
            Self::Question => Some("QUESTION"),
            Self::Success => Some("SUCCESS"),
            Self::Warning => Some("WARNING"),
            Self::Error => Some("ERROR"),
            Self::Note => Some("NOTE"),
            Self::Debug => Some("DEBUG"),
        }
    }
}

/// Styled output and interactive input
pub trait Console {
    /// Write a (possibly multi-line) message
    fn write(&mut self, tone: Tone, text: &str);

    /// Read one line of free text; an empty answer selects `default`
    fn read_line(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Pick one of `items`, returning its index
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Ask a yes/no question
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Render rows as a table, under `header` when it is not empty
    fn table(&mut self, header: &[String], rows: &[Vec<String>]) {
        if !header.is_empty() {
            self.write(Tone::Plain, &header.join("  "));
        }
        for row in rows {
            self.write(Tone::Plain, &row.join("  "));
        }
    }

    /// Write `text` followed by a highlighted `emphasized` part
    ///
    /// Used to point at the offending part of an answer, such as the
    /// characters past a length limit.
    fn emphasis(&mut self, tone: Tone, text: &str, emphasized: &str) {
        self.write(tone, &format!("{text}{emphasized}"));
    }

    /// Full-width horizontal rule
    fn separator(&mut self, tone: Tone) {
        self.write(tone, &"_".repeat(60));
    }

    /// Report the error that ended a command
    ///
    /// Terminal consoles send this to the error stream.
    fn report_error(&mut self, text: &str) {
        self.write(Tone::Error, text);
    }

    /// Shorthand for [`Tone::Info`]
    fn info(&mut self, text: &str) {
        self.write(Tone::Info, text);
    }

    /// Shorthand for [`Tone::Comment`]
    fn comment(&mut self, text: &str) {
        self.write(Tone::Comment, text);
    }

    /// Shorthand for [`Tone::Question`]
    fn question(&mut self, text: &str) {
        self.write(Tone::Question, text);
    }

    /// Shorthand for [`Tone::Success`]
    fn success(&mut self, text: &str) {
        self.write(Tone::Success, text);
    }

    /// Shorthand for [`Tone::Warning`]
    fn warning(&mut self, text: &str) {
        self.write(Tone::Warning, text);
    }

    /// Shorthand for [`Tone::Error`]
    fn error(&mut self, text: &str) {
        self.write(Tone::Error, text);
    }
}

/// A prepared answer for [`ScriptedConsole`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Free text line
    Text(String),
    /// Index into a choice list
    Choice(usize),
    /// Yes/no
    Confirm(bool),
}

#[derive(Debug, Default)]
struct Transcript {
    answers: VecDeque<Answer>,
    lines: Vec<(Tone, String)>,
    questions: Vec<String>,
}

/// In-memory console driven by a queue of answers
///
/// Clones share the same transcript, so a test can keep a handle while the
/// console itself is moved into the code under test. Emphasized text is
/// recorded in square brackets.
///
/// # Examples
///
/// ```
/// use moo_core::{Console, ScriptedConsole};
///
/// let console = ScriptedConsole::new().answer("Fix login bug").confirm(true);
/// let mut handle = console.clone();
/// assert_eq!(handle.read_line("> ", None).unwrap(), "Fix login bug");
/// assert!(Console::confirm(&mut handle, "Commit?", false).unwrap());
/// assert_eq!(console.questions().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    inner: Rc<RefCell<Transcript>>,
}

impl ScriptedConsole {
    /// Create a console with no prepared answers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a free text answer
    #[must_use]
    pub fn answer(self, text: impl Into<String>) -> Self {
        self.push(Answer::Text(text.into()))
    }

    /// Queue a choice answer
    #[must_use]
    pub fn choose(self, index: usize) -> Self {
        self.push(Answer::Choice(index))
    }

    /// Queue a yes/no answer
    #[must_use]
    pub fn confirm(self, yes: bool) -> Self {
        self.push(Answer::Confirm(yes))
    }

    fn push(self, answer: Answer) -> Self {
        self.inner.borrow_mut().answers.push_back(answer);
        self
    }

    /// Every message written so far
    #[must_use]
    pub fn lines(&self) -> Vec<(Tone, String)> {
        self.inner.borrow().lines.clone()
    }

    /// Messages written with the given tone
    #[must_use]
    pub fn lines_with(&self, tone: Tone) -> Vec<String> {
        self.inner
            .borrow()
            .lines
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Every prompt shown so far, in order
    #[must_use]
    pub fn questions(&self) -> Vec<String> {
        self.inner.borrow().questions.clone()
    }

    /// Number of prepared answers not consumed yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.inner.borrow().answers.len()
    }

    fn next(&self, prompt: &str) -> Result<Answer> {
        let mut inner = self.inner.borrow_mut();
        inner.questions.push(prompt.to_string());
        inner
            .answers
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no scripted answer left for '{prompt}'")))
    }
}

impl Console for ScriptedConsole {
    fn write(&mut self, tone: Tone, text: &str) {
        self.inner.borrow_mut().lines.push((tone, text.to_string()));
    }

    fn emphasis(&mut self, tone: Tone, text: &str, emphasized: &str) {
        self.write(tone, &format!("{text}[{emphasized}]"));
    }

    fn read_line(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) if text.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) => Ok(text),
            other => Err(Error::Prompt(format!(
                "expected a text answer for '{prompt}', got {other:?}"
            ))),
        }
    }

    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        match self.next(prompt)? {
            Answer::Choice(index) if index < items.len() => Ok(index),
            Answer::Choice(index) => Err(Error::Prompt(format!(
                "choice {index} out of range for '{prompt}' ({} items)",
                items.len()
            ))),
            Answer::Text(text) if text.is_empty() => Ok(default),
            other => Err(Error::Prompt(format!(
                "expected a choice for '{prompt}', got {other:?}"
            ))),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(yes),
            Answer::Text(text) if text.is_empty() => Ok(default),
            other => Err(Error::Prompt(format!(
                "expected yes/no for '{prompt}', got {other:?}"
            ))),
        }
    }
}
