//! External process interface
//!
//! Commands never build shell strings by concatenating user input. They
//! describe a command as a [`ShellCommand`] template with `%s` placeholders
//! and a list of arguments, and a [`Shell`] implementation renders it with
//! every argument quoted.

use crate::{Error, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Command line template plus the arguments substituted into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    template: String,
    args: Vec<String>,
}

impl ShellCommand {
    /// Create a command from a template such as `git commit -m %s`
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Add the value for the next `%s` placeholder
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// The raw template
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The unquoted substitution arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Render the command line with every argument shell-quoted
    ///
    /// `%s` takes the next argument, `%%` is a literal percent sign. The
    /// number of placeholders must match the number of arguments.
    pub fn render(&self) -> Result<String> {
        let mut rendered = String::with_capacity(self.template.len());
        let mut args = self.args.iter();
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                rendered.push(c);
                continue;
            }
            match chars.next() {
                Some('s') => {
                    let arg = args.next().ok_or_else(|| {
                        Error::Message(format!(
                            "Not enough arguments for command template `{}`",
                            self.template
                        ))
                    })?;
                    rendered.push_str(&shell_words::quote(arg));
                }
                Some('%') => rendered.push('%'),
                Some(other) => {
                    rendered.push('%');
                    rendered.push(other);
                }
                None => rendered.push('%'),
            }
        }

        if args.next().is_some() {
            return Err(Error::Message(format!(
                "Too many arguments for command template `{}`",
                self.template
            )));
        }
        Ok(rendered)
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(line) => f.write_str(&line),
            Err(_) => f.write_str(&self.template),
        }
    }
}

/// Exit status and combined output of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, -1 when terminated by a signal
    pub code: i32,
    /// Captured stdout and stderr
    pub output: String,
}

impl ProcessOutput {
    /// Create an output record
    pub fn new(code: i32, output: impl Into<String>) -> Self {
        Self {
            code,
            output: output.into(),
        }
    }

    /// Whether the process exited with code 0
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Non-blank output lines, trimmed
    pub fn lines(&self) -> Vec<String> {
        self.output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Executes external commands
pub trait Shell {
    /// Run to completion and capture the output
    fn exec(&self, command: &ShellCommand) -> Result<ProcessOutput>;

    /// Run with the terminal attached so output streams live
    ///
    /// Returns whether the process succeeded.
    fn exec_real_time(&self, command: &ShellCommand) -> Result<bool>;

    /// Whether `program` can be found on `PATH`
    fn is_installed(&self, program: &str) -> bool;
}

#[derive(Debug, Default)]
struct ShellTranscript {
    responses: Vec<(String, ProcessOutput)>,
    installed: Vec<String>,
    executed: Vec<String>,
    streamed: Vec<String>,
}

/// In-memory [`Shell`] answering with prepared outputs
///
/// Each executed command is rendered and recorded. The first prepared
/// response whose prefix matches the rendered line is returned; unmatched
/// commands succeed with empty output. Clones share one transcript.
///
/// # Examples
///
/// ```
/// use moo_core::{Shell, ShellCommand};
/// use moo_core::traits::ScriptedShell;
///
/// let shell = ScriptedShell::new().respond("git diff", 0, "src/lib.rs\n");
/// let out = shell.exec(&ShellCommand::new("git diff --name-only --cached")).unwrap();
/// assert_eq!(out.lines(), vec!["src/lib.rs"]);
/// assert_eq!(shell.executed(), vec!["git diff --name-only --cached"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedShell {
    inner: Rc<RefCell<ShellTranscript>>,
}

impl ScriptedShell {
    /// Create a shell where every command succeeds silently
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix`
    #[must_use]
    pub fn respond(self, prefix: impl Into<String>, code: i32, output: impl Into<String>) -> Self {
        self.inner
            .borrow_mut()
            .responses
            .push((prefix.into(), ProcessOutput::new(code, output)));
        self
    }

    /// Mark `program` as present on `PATH`
    #[must_use]
    pub fn installed(self, program: impl Into<String>) -> Self {
        self.inner.borrow_mut().installed.push(program.into());
        self
    }

    /// Every rendered command, captured or streamed, in order
    pub fn executed(&self) -> Vec<String> {
        self.inner.borrow().executed.clone()
    }

    /// Rendered commands that were run with live output
    pub fn streamed(&self) -> Vec<String> {
        self.inner.borrow().streamed.clone()
    }

    fn answer(&self, line: &str) -> ProcessOutput {
        self.inner
            .borrow()
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map_or_else(|| ProcessOutput::new(0, ""), |(_, out)| out.clone())
    }
}

impl Shell for ScriptedShell {
    fn exec(&self, command: &ShellCommand) -> Result<ProcessOutput> {
        let line = command.render()?;
        self.inner.borrow_mut().executed.push(line.clone());
        Ok(self.answer(&line))
    }

    fn exec_real_time(&self, command: &ShellCommand) -> Result<bool> {
        let line = command.render()?;
        {
            let mut inner = self.inner.borrow_mut();
            inner.executed.push(line.clone());
            inner.streamed.push(line.clone());
        }
        Ok(self.answer(&line).is_success())
    }

    fn is_installed(&self, program: &str) -> bool {
        self.inner.borrow().installed.iter().any(|p| p == program)
    }
}
