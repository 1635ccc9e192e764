//! `moo csfixer`: run php-cs-fixer on selected paths

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::descriptor::{ArgumentSpec, CommandDescriptor, OptionSpec};
use crate::error::Result;
use moo_core::{Error, ShellCommand, Tone};
use std::path::Path;

const PROGRAM: &str = "php-cs-fixer";

/// Fix coding standard violations with php-cs-fixer
#[derive(Debug, Default)]
pub struct CsFixerCommand;

impl CsFixerCommand {
    fn update(ctx: &mut RuntimeContext<'_>) -> Result<()> {
        ctx.console.info("Updating php-cs-fixer to latest version...");
        let command = ShellCommand::new("php-cs-fixer self-update");
        if !ctx.shell.exec_real_time(&command)? {
            return Err(Error::Message("Failed to update php-cs-fixer.".into()).into());
        }
        Ok(())
    }

    fn fix_command(ctx: &RuntimeContext<'_>) -> String {
        let mut template = String::from("php-cs-fixer fix %s --rules=%s");
        if ctx.verbose {
            template.push_str(" --verbose");
        }
        if ctx.input.flag("dry") {
            template.push_str(" --dry-run");
        }
        if ctx.input.flag("risky") {
            template.push_str(" --allow-risky=yes");
        }
        template
    }
}

impl Command for CsFixerCommand {
    fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("csfixer", "Execute php-cs-fixer on selected paths.")
            .argument(
                ArgumentSpec::optional("paths")
                    .multiple()
                    .help("List of relative paths."),
            )
            .option(
                OptionSpec::flag("dry")
                    .short('d')
                    .help("Displays the files that need to be fixed but without modifying them."),
            )
            .option(
                OptionSpec::flag("risky")
                    .short('r')
                    .help("Allows you to set whether risky rules may run."),
            )
            .option(
                OptionSpec::flag("update")
                    .short('u')
                    .help("Update php-cs-fixer"),
            )
    }

    fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        if ctx.input.flag("update") {
            return Self::update(ctx);
        }

        let paths = ctx.input.arguments("paths").to_vec();
        if paths.is_empty() {
            return Err(Error::MissingArgument("paths".into()).into());
        }

        let shell = ctx.shell;
        let installed = ctx
            .cache
            .flag_or_insert_with("which:php-cs-fixer", || shell.is_installed(PROGRAM));
        if !installed {
            return Err(Error::Message(
                "php-cs-fixer is not installed. Install it and make sure it is on your PATH."
                    .into(),
            )
            .into());
        }

        let rules = ctx.config.csfixer.rules_json()?;
        let template = Self::fix_command(ctx);

        for path in &paths {
            ctx.console.write(Tone::Title, &format!("Fixing: {path}"));
            if !Path::new(path).exists() {
                ctx.console.warning(&format!("Path not found: {path}"));
                continue;
            }

            let command = ShellCommand::new(template.as_str())
                .arg(path.as_str())
                .arg(rules.as_str());
            if !ctx.shell.exec_real_time(&command)? {
                ctx.console
                    .warning(&format!("php-cs-fixer reported problems in {path}"));
            }
        }
        Ok(())
    }
}
