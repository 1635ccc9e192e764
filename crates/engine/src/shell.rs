//! Process execution with duct
//!
//! Commands are rendered from their template, split into words with
//! shell-words and started directly, without a shell in between. Quoting
//! done at render time therefore only has to survive the split.

use crate::{Error, Result};
use moo_core::{ProcessOutput, Shell, ShellCommand};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Exit code reported when the program cannot be found
const NOT_FOUND_CODE: i32 = 127;

/// [`Shell`] backed by real processes
#[derive(Debug, Clone, Default)]
pub struct DuctShell {
    working_dir: Option<PathBuf>,
}

impl DuctShell {
    /// Run commands in the current directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands in `dir`
    #[must_use]
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    fn expression(&self, command: &ShellCommand) -> Result<(String, duct::Expression)> {
        let line = command.render()?;
        let parts = shell_words::split(&line)
            .map_err(|e| Error::Message(format!("Failed to parse command '{line}': {e}")))?;

        let Some((program, args)) = parts.split_first() else {
            return Err(Error::Message("Empty command".to_string()));
        };

        tracing::debug!("Executing command: {} {:?}", program, args);

        let mut expression = duct::cmd(program, args).unchecked();
        if let Some(dir) = &self.working_dir {
            expression = expression.dir(dir);
        }
        Ok((program.clone(), expression))
    }
}

impl Shell for DuctShell {
    #[tracing::instrument(skip(self), fields(cmd = %command))]
    fn exec(&self, command: &ShellCommand) -> Result<ProcessOutput> {
        let (program, expression) = self.expression(command)?;

        let result = match expression.stderr_to_stdout().stdout_capture().run() {
            Ok(output) => ProcessOutput::new(
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stdout),
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ProcessOutput::new(NOT_FOUND_CODE, format!("{program}: command not found"))
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(code = result.code, output = %result.output.trim_end(), "Command finished");
        Ok(result)
    }

    #[tracing::instrument(skip(self), fields(cmd = %command))]
    fn exec_real_time(&self, command: &ShellCommand) -> Result<bool> {
        let (program, expression) = self.expression(command)?;

        match expression.run() {
            Ok(output) => {
                tracing::debug!(code = ?output.status.code(), "Command finished");
                Ok(output.status.success())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("{program}: command not found");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn is_installed(&self, program: &str) -> bool {
        let found = which::which(program).is_ok();
        tracing::debug!(program, found, "Checked PATH");
        found
    }
}
