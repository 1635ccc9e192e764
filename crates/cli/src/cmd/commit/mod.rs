//! `moo commit`: git commit with a standardised message
//!
//! The configured [`CommitStyle`] decides which fields the message has.
//! Each field is settled by the resolver: a shortcut flag first, then a
//! value given on the command line, then the style's own collector, then
//! the generic question. Staged files are confirmed before committing.

mod categorised;
mod imperative;
pub mod style;

pub use categorised::CategorisedStyle;
pub use imperative::ImperativeMoodStyle;
pub use style::{CommitField, CommitStyle, FieldInput, Shortcut};

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::descriptor::{ArgumentSpec, CommandDescriptor, OptionSpec};
use crate::error::Result;
use moo_config::Config;
use moo_core::validate::RuleResult;
use moo_core::{
    Bypass, Console, Error, FieldSource, PromptEngine, Resolver, Rule, Shell, ShellCommand, Step,
    Tone, ValidationError, ValidatorChain,
};
use moo_engine::LookupCache;

const ABOUT: &str = "Git Commit wrapper to standardise the commit messages";

/// Standardised git commit
#[derive(Default)]
pub struct CommitCommand {
    style: Option<Box<dyn CommitStyle>>,
}

impl CommitCommand {
    fn style(&mut self) -> Result<&mut dyn CommitStyle> {
        match self.style.as_deref_mut() {
            Some(style) => Ok(style),
            None => Err(anyhow::anyhow!("commit style used before initialize").into()),
        }
    }

    fn shortcut(ctx: &RuntimeContext<'_>) -> Option<Shortcut> {
        ctx.input
            .active_shortcut(&ctx.descriptor().shortcuts)
            .map(Shortcut::named)
    }
}

/// Name the style in the help text and add the options it declares
///
/// Style options come before the built-in flags. Style shortcuts are
/// checked after the built-in ones.
fn with_style(descriptor: CommandDescriptor, style: &dyn CommitStyle) -> CommandDescriptor {
    let mut descriptor = CommandDescriptor {
        about: format!("{ABOUT} ({}).", style.display_name()),
        ..descriptor
    };
    let builtin = std::mem::take(&mut descriptor.options);
    descriptor.options = style.options();
    descriptor.options.extend(builtin);
    style
        .shortcut_options()
        .into_iter()
        .fold(descriptor, CommandDescriptor::shortcut)
}

impl Command for CommitCommand {
    fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("commit", format!("{ABOUT}."))
            .argument(ArgumentSpec::optional("message").help("Commit message"))
            .argument(ArgumentSpec::optional("details").help("Commit details"))
            .option(
                OptionSpec::flag("oneline")
                    .short('o')
                    .help("Option to skip asking for the optional details."),
            )
            .shortcut(
                OptionSpec::flag("csfixes")
                    .short('c')
                    .help("Shortcut commit changes with default message about CS fixes"),
            )
            .shortcut(
                OptionSpec::flag("dependencies").short('d').help(
                    "Shortcut commit changes with default message about updating composer.json \
                     & composer.lock",
                ),
            )
            .shortcut(
                OptionSpec::flag("gitignore")
                    .short('i')
                    .help("Shortcut commit changes with default message about updating .gitignore"),
            )
    }

    fn configure(descriptor: CommandDescriptor, config: &Config) -> CommandDescriptor {
        match style::from_config(config) {
            Ok(style) => with_style(descriptor, style.as_ref()),
            Err(err) => {
                // Reported by initialize once the command runs
                tracing::debug!(error = %err, "Commit style not available for the command line");
                descriptor
            }
        }
    }

    fn initialize(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let mut style = style::from_config(&ctx.config)?;
        if let Some(shortcut) = Self::shortcut(ctx) {
            style.before_shortcut(shortcut, &mut *ctx.console);
        }
        self.style = Some(style);
        Ok(())
    }

    fn interact(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let shortcut = Self::shortcut(ctx);
        let config = std::sync::Arc::clone(&ctx.config);
        let style = self.style()?;

        let mut validators = ValidatorChain::new();
        validators.register(
            "Message.Length",
            MessageLength {
                max: config.commit.message_max_length,
            },
        );
        let validators = validators.merge(style.validators());

        if let Some(message) = shortcut.and_then(|shortcut| style.shortcut_message(shortcut)) {
            ctx.console.separator(Tone::Comment);
            ctx.console.comment(message);
            ctx.console.separator(Tone::Comment);
        }

        let mut source = CommitFields {
            style,
            shortcut,
            oneline: ctx.input.flag("oneline"),
            message: ctx.input.argument("message").map(ToString::to_string),
            details: ctx.input.argument("details").map(ToString::to_string),
            shell: ctx.shell,
            cache: &mut ctx.cache,
        };
        Resolver::new(&validators)
            .with_max_attempts(config.max_attempts())
            .run(&mut source, &mut *ctx.console, &mut ctx.resolved)?;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        confirm_staged_files(ctx)?;

        let message = ctx
            .resolved
            .get(CommitField::Message.as_str())
            .ok_or_else(|| Error::MissingArgument(CommitField::Message.to_string()))?;
        let details = wordwrap(
            ctx.resolved
                .get(CommitField::Details.as_str())
                .unwrap_or_default(),
            ctx.config.commit.details_width,
        );
        let command = self.style()?.commit_command(message, &details, &ctx.resolved);

        let out = ctx.shell.exec(&command)?;
        if !out.is_success() {
            ctx.console.error("Failed to commit!");
            if !out.output.trim().is_empty() {
                ctx.console.comment(out.output.trim_end());
            }
            return Err(Error::Process {
                command: command.to_string(),
                code: out.code,
                output: out.output,
            }
            .into());
        }

        ctx.console.success("Changes committed!");
        let status = ctx.shell.exec(&ShellCommand::new("git status"))?;
        if !status.output.trim().is_empty() {
            ctx.console.comment(status.output.trim_end());
        }
        Ok(())
    }
}

/// Ask the user to confirm the staged files before committing
fn confirm_staged_files(ctx: &mut RuntimeContext<'_>) -> Result<()> {
    let command = ShellCommand::new("git diff --name-only --cached");
    let out = ctx.shell.exec(&command)?;
    if !out.is_success() {
        return Err(Error::Process {
            command: command.to_string(),
            code: out.code,
            output: out.output,
        }
        .into());
    }

    let files = out.lines();
    if files.is_empty() {
        return Err(Error::Aborted("There are no files to commit.".into()).into());
    }

    ctx.console.question(&format!(
        "Are these the files you have changed & would like to commit them?\n{}",
        files.join("\n")
    ));
    if !ctx.prompt().ask_confirm("[yes/no]", false)? {
        return Err(Error::Aborted("Commit aborted by user.".into()).into());
    }
    Ok(())
}

/// Field source driving a [`CommitStyle`]
struct CommitFields<'a> {
    style: &'a mut dyn CommitStyle,
    shortcut: Option<Shortcut>,
    oneline: bool,
    message: Option<String>,
    details: Option<String>,
    shell: &'a dyn Shell,
    cache: &'a mut LookupCache,
}

fn commit_field(name: &str) -> moo_core::Result<CommitField> {
    CommitField::parse(name).ok_or_else(|| Error::Message(format!("Unknown commit field '{name}'")))
}

impl FieldSource for CommitFields<'_> {
    fn fields(&self) -> Vec<String> {
        self.style
            .fields()
            .iter()
            .map(|field| field.as_str().to_string())
            .collect()
    }

    fn supplied(&self, field: &str) -> Option<String> {
        match CommitField::parse(field)? {
            CommitField::Message => self.message.clone(),
            CommitField::Details => self.details.clone(),
            CommitField::Type | CommitField::Issue => None,
        }
    }

    fn bypass(&self, field: &str) -> Bypass {
        let Some(shortcut) = self.shortcut else {
            return Bypass::Inactive;
        };
        let Some(message) = self.style.shortcut_message(shortcut) else {
            return Bypass::Inactive;
        };
        match CommitField::parse(field) {
            Some(CommitField::Message) => Bypass::Value(message.to_string()),
            // Details given on the command line still go into the body
            Some(CommitField::Details) if self.details.is_some() => Bypass::Inactive,
            Some(CommitField::Details) => {
                let details = self.style.shortcut_details(shortcut);
                if details.is_empty() {
                    Bypass::Suppressed
                } else {
                    Bypass::Value(details)
                }
            }
            _ => Bypass::Suppressed,
        }
    }

    fn before_input(&mut self, field: &str, console: &mut dyn Console) -> moo_core::Result<()> {
        self.style.before_input(commit_field(field)?, console);
        Ok(())
    }

    fn collect(
        &mut self,
        field: &str,
        engine: &mut PromptEngine<'_>,
        validators: &ValidatorChain,
    ) -> moo_core::Result<Step> {
        let field = commit_field(field)?;
        let mut input = FieldInput::new(engine, validators, self.oneline, self.shell, self.cache);
        if let Some(step) = self.style.collect(field, &mut input)? {
            return Ok(step);
        }

        Ok(match field {
            CommitField::Details if self.oneline => Step::Skip,
            CommitField::Details => Step::Prompt {
                question: "Enter Commit Details (optional):".into(),
                default: None,
            },
            CommitField::Message => Step::Prompt {
                question: "Enter Commit Message:".into(),
                default: None,
            },
            CommitField::Type | CommitField::Issue => Step::Prompt {
                question: format!("Enter Commit {field}:"),
                default: None,
            },
        })
    }
}

/// Subject length limit, counted in characters after trimming
struct MessageLength {
    max: usize,
}

impl Rule for MessageLength {
    fn validate(&self, value: String, console: &mut dyn Console) -> RuleResult {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::new("Commit message must not be empty."));
        }

        if let Some((split, _)) = value.char_indices().nth(self.max) {
            let (kept, overflow) = value.split_at(split);
            console.emphasis(Tone::Warning, kept, overflow);
            return Err(ValidationError::new(format!(
                "Commit message must not be more than {} characters.",
                self.max
            )));
        }
        Ok(value.to_string())
    }
}

/// Wrap each line at `width` columns, breaking at spaces only
fn wordwrap(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, width: usize) -> String {
    let mut wrapped = String::with_capacity(line.len());
    let mut column = 0;
    for (index, word) in line.split(' ').enumerate() {
        let len = word.chars().count();
        if index > 0 {
            if column > 0 && column + 1 + len > width {
                wrapped.push('\n');
                column = 0;
            } else {
                wrapped.push(' ');
                column += 1;
            }
        }
        wrapped.push_str(word);
        column += len;
    }
    wrapped
}
