//! Commit style strategy
//!
//! A style decides which fields a commit message has, how each of them is
//! collected and validated, what the shortcut messages say and how the
//! final `git commit` invocation looks.

use super::{CategorisedStyle, ImperativeMoodStyle};
use crate::descriptor::OptionSpec;
use moo_config::{CommitStyleName, Config};
use moo_core::{
    Console, PromptEngine, ResolvedArguments, Result, Shell, ShellCommand, Step, ValidatorChain,
};
use moo_engine::LookupCache;
use std::fmt;

/// Cache key for the issue number derived from the current branch
const BRANCH_ISSUE_KEY: &str = "git:branch-issue";

/// A field of a commit message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitField {
    /// Commit category
    Type,
    /// Subject line
    Message,
    /// Ticket reference
    Issue,
    /// Optional body
    Details,
}

impl CommitField {
    /// Name used for resolved arguments and validator keys
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Message => "Message",
            Self::Issue => "Issue",
            Self::Details => "Details",
        }
    }

    /// Parse a field name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        [Self::Type, Self::Message, Self::Issue, Self::Details]
            .into_iter()
            .find(|field| field.as_str() == name)
    }
}

impl fmt::Display for CommitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags that commit with a predefined message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Coding standard fixes
    CsFixes,
    /// Composer dependency updates
    Dependencies,
    /// `.gitignore` changes
    Gitignore,
    /// A shortcut flag declared by the active style
    Style(&'static str),
}

impl Shortcut {
    /// Option name on the command line
    #[must_use]
    pub fn option_name(self) -> &'static str {
        match self {
            Self::CsFixes => "csfixes",
            Self::Dependencies => "dependencies",
            Self::Gitignore => "gitignore",
            Self::Style(name) => name,
        }
    }

    /// Parse the name of a built-in shortcut
    #[must_use]
    pub fn from_option(name: &str) -> Option<Self> {
        [Self::CsFixes, Self::Dependencies, Self::Gitignore]
            .into_iter()
            .find(|shortcut| shortcut.option_name() == name)
    }

    /// The shortcut behind an active shortcut flag
    ///
    /// Names that are not built in belong to the style.
    #[must_use]
    pub fn named(name: &'static str) -> Self {
        Self::from_option(name).unwrap_or(Self::Style(name))
    }
}

/// What a custom collector may use besides the prompt engine
pub struct FieldInput<'a, 'p> {
    /// Prompt engine with the configured attempt ceiling
    pub engine: &'a mut PromptEngine<'p>,
    /// Active validator chain
    pub validators: &'a ValidatorChain,
    /// `--oneline` was given
    pub oneline: bool,
    shell: &'a dyn Shell,
    cache: &'a mut LookupCache,
}

impl<'a, 'p> FieldInput<'a, 'p> {
    /// Bundle the collector inputs
    pub fn new(
        engine: &'a mut PromptEngine<'p>,
        validators: &'a ValidatorChain,
        oneline: bool,
        shell: &'a dyn Shell,
        cache: &'a mut LookupCache,
    ) -> Self {
        Self {
            engine,
            validators,
            oneline,
            shell,
            cache,
        }
    }

    /// Issue number taken from the checked out branch name
    ///
    /// Looked up once per invocation. Any git failure means no suggestion.
    pub fn issue_from_branch(&mut self) -> Option<String> {
        let shell = self.shell;
        let lookup = self.cache.text_or_try_insert_with(BRANCH_ISSUE_KEY, || {
            let out = shell.exec(&ShellCommand::new("git branch --show-current"))?;
            Ok(if out.is_success() {
                issue_from_branch(&out.output).unwrap_or_default()
            } else {
                String::new()
            })
        });
        match lookup {
            Ok(issue) if !issue.is_empty() => Some(issue),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "Branch lookup failed");
                None
            }
        }
    }
}

/// Extract a ticket such as `ABC-123` from a branch like `feature/ABC-123_login`
#[must_use]
pub fn issue_from_branch(branch: &str) -> Option<String> {
    let branch = branch.trim();
    let mut parts = branch.split('/');
    let first = parts.next()?;
    let name = parts.next().unwrap_or(first);

    let (key, rest) = name.split_once('-')?;
    let number = rest.split(['-', '_']).next().unwrap_or_default();
    if key.is_empty() || number.is_empty() {
        return None;
    }
    Some(format!("{key}-{number}"))
}

/// Strategy for one commit message convention
pub trait CommitStyle {
    /// Human readable name
    fn display_name(&self) -> &'static str;

    /// Fields in the order they are resolved
    fn fields(&self) -> &'static [CommitField];

    /// Extra options accepted by `moo commit` under this style
    fn options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    /// Extra shortcut flags, checked after the built-in ones
    fn shortcut_options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    /// Subject used when `shortcut` is active
    ///
    /// `None` leaves every field to the normal flow; the style is expected
    /// to handle the flag in its own hooks.
    fn shortcut_message(&self, shortcut: Shortcut) -> Option<&str>;

    /// Body used when `shortcut` is active; empty for none
    fn shortcut_details(&self, _shortcut: Shortcut) -> String {
        String::new()
    }

    /// Style specific validators
    fn validators(&self) -> ValidatorChain;

    /// Called once before a shortcut commit is prepared
    fn before_shortcut(&mut self, _shortcut: Shortcut, _console: &mut dyn Console) {}

    /// Called right before `field` is collected interactively
    fn before_input(&mut self, _field: CommitField, _console: &mut dyn Console) {}

    /// Custom collector for `field`
    ///
    /// `None` leaves the field to the generic question.
    fn collect(
        &mut self,
        _field: CommitField,
        _input: &mut FieldInput<'_, '_>,
    ) -> Result<Option<Step>> {
        Ok(None)
    }

    /// The `git commit` invocation for the resolved fields
    ///
    /// `details` is already wrapped.
    fn commit_command(
        &self,
        message: &str,
        details: &str,
        resolved: &ResolvedArguments,
    ) -> ShellCommand;
}

/// Build the style named in `commit.style`
pub fn from_config(config: &Config) -> Result<Box<dyn CommitStyle>> {
    let style: Box<dyn CommitStyle> = match config.commit.style_name()? {
        CommitStyleName::ImperativeMood => Box::new(ImperativeMoodStyle::new(
            config.commit.require_words()?.to_vec(),
        )),
        CommitStyleName::Categorised => {
            Box::new(CategorisedStyle::new(&config.commit.categories))
        }
    };
    tracing::debug!(style = style.display_name(), "Commit style selected");
    Ok(style)
}
