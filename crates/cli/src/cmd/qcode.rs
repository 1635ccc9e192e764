//! `moo qcode`: run code quality analysers on selected paths
//!
//! Each path is checked by every selected analyser. A path that is or
//! contains a `composer.lock` gets the security advisories check; a path
//! to the lock file itself gets nothing else.

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::descriptor::{ArgumentSpec, CommandDescriptor, OptionSpec, ParsedInput};
use crate::error::Result;
use moo_core::{Error, ShellCommand, Tone};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const LOCK_FILE: &str = "composer.lock";

const ADVISORIES_URL: &str = "https://security.sensiolabs.org/check_lock";

const MESS_RULES: &str = "cleancode,codesize,controversial,design,naming,unusedcode";

/// Name given to the dependency diagram written by dePHPend
const DIAGRAM_NAME: &str = "qcode";

/// A code quality tool `moo qcode` can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyser {
    /// phpmd
    Mess,
    /// phpcpd
    CopyPaste,
    /// parallel-lint
    Lint,
    /// Security advisories for `composer.lock`
    Security,
    /// phpstan, command chosen per code base
    PhpStan,
    /// dephpend
    Dephpend,
    /// phpinsights
    PhpInsights,
}

impl Analyser {
    /// Every analyser, in the order they run
    pub const ALL: [Self; 7] = [
        Self::Mess,
        Self::CopyPaste,
        Self::Lint,
        Self::Security,
        Self::PhpStan,
        Self::Dephpend,
        Self::PhpInsights,
    ];

    /// Option selecting this analyser
    #[must_use]
    pub fn option(self) -> &'static str {
        match self {
            Self::Mess => "mess",
            Self::CopyPaste => "copypaste",
            Self::Lint => "lint",
            Self::Security => "security",
            Self::PhpStan => "phpstan",
            Self::Dephpend => "dephpend",
            Self::PhpInsights => "phpinsights",
        }
    }

    fn short(self) -> char {
        match self {
            Self::Mess => 'm',
            Self::CopyPaste => 'c',
            Self::Lint => 'l',
            Self::Security => 's',
            Self::PhpStan => 'p',
            Self::Dephpend => 'd',
            Self::PhpInsights => 'i',
        }
    }

    fn help(self) -> &'static str {
        match self {
            Self::Mess => "Mess Detector Analyses",
            Self::CopyPaste => "Copy/Paste Detector Analyses",
            Self::Lint => "PHP Parallel Lint Analyses",
            Self::Security => "Security Advisories Checker Analyses",
            Self::PhpStan => "PHP Static Analysis Tool",
            Self::Dephpend => "dePHPend Tool",
            Self::PhpInsights => "PHP Insights Analysis Tool",
        }
    }

    /// Heading shown before the analyser's output
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Mess => "Mess Detector",
            Self::CopyPaste => "Copy/Paste Detector",
            Self::Lint => "PHP Parallel Lint",
            Self::Security => "Security Advisories Checker",
            Self::PhpStan => "PHP Static Analysis Tool",
            Self::Dephpend => "dePHPend Tool",
            Self::PhpInsights => "PHP Insights Analysis Tool",
        }
    }

    /// Program that must be on `PATH`
    ///
    /// phpstan is started through the configured command instead.
    fn program(self) -> Option<&'static str> {
        match self {
            Self::Mess => Some("phpmd"),
            Self::CopyPaste => Some("phpcpd"),
            Self::Lint => Some("parallel-lint"),
            Self::Security => Some("curl"),
            Self::PhpStan => None,
            Self::Dephpend => Some("dephpend"),
            Self::PhpInsights => Some("phpinsights"),
        }
    }

    /// Whether this analyser looks at `target`
    fn applies_to(self, target: &Target<'_>) -> bool {
        match self {
            Self::Security => target.is_lock || target.has_lock,
            _ => !target.is_lock,
        }
    }
}

/// Analysers named on the command line
///
/// Naming none of them, or all of them, runs every analyser.
#[must_use]
pub fn selected(input: &ParsedInput) -> Vec<Analyser> {
    let chosen: Vec<Analyser> = Analyser::ALL
        .into_iter()
        .filter(|analyser| input.flag(analyser.option()))
        .collect();
    if chosen.is_empty() {
        Analyser::ALL.to_vec()
    } else {
        chosen
    }
}

/// A path given to `moo qcode`
struct Target<'a> {
    path: &'a str,
    /// The path names the lock file itself
    is_lock: bool,
    /// The path is a directory holding a lock file
    has_lock: bool,
}

impl<'a> Target<'a> {
    fn new(path: &'a str) -> Self {
        Self {
            path,
            is_lock: path.contains(LOCK_FILE),
            has_lock: Path::new(path.trim_end_matches('/')).join(LOCK_FILE).exists(),
        }
    }

    fn lock_file(&self) -> String {
        if self.is_lock {
            self.path.to_string()
        } else {
            format!("{}/{LOCK_FILE}", self.path.trim_end_matches('/'))
        }
    }
}

/// Project layout deciding which phpstan command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeBase {
    /// Plain composer project
    Default,
    /// Has an `artisan` script
    Laravel,
    /// Has `vendor/silverstripe`
    SilverStripe,
}

impl CodeBase {
    /// Detect the code base rooted at `site_root`
    #[must_use]
    pub fn detect(site_root: &Path) -> Self {
        if site_root.join("artisan").exists() {
            Self::Laravel
        } else if site_root.join("vendor/silverstripe").is_dir() {
            Self::SilverStripe
        } else {
            Self::Default
        }
    }

    /// Key under `qcode.phpstan`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Laravel => "laravel",
            Self::SilverStripe => "silverstripe",
        }
    }

    fn default_command(self) -> &'static str {
        match self {
            Self::Default => {
                "{site_root}vendor/bin/phpstan analyse {path} \
                 --level 1 --memory-limit=5000M --ansi"
            }
            Self::Laravel => "php artisan code:analyse --paths={path}",
            Self::SilverStripe => {
                "{site_root}vendor/bin/phpstan analyse {path} -c {site_root}phpstan.neon \
                 -a {site_root}vendor/symbiote/silverstripe-phpstan/bootstrap.php \
                 --level 1 --memory-limit=5000M --ansi"
            }
        }
    }
}

impl fmt::Display for CodeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn a `{path}`/`{site_root}` command into a quoted [`ShellCommand`]
///
/// Other braces and percent signs are kept literally.
#[must_use]
pub fn expand_tokens(template: &str, path: &str, site_root: &str) -> ShellCommand {
    let escaped = template.replace('%', "%%");
    let mut rendered = String::with_capacity(escaped.len());
    let mut args = Vec::new();
    let mut rest = escaped.as_str();

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{path}") {
            rendered.push_str("%s");
            args.push(path);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{site_root}") {
            rendered.push_str("%s");
            args.push(site_root);
            rest = after;
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }
    rendered.push_str(rest);

    args.into_iter().fold(ShellCommand::new(rendered), |command, arg| command.arg(arg))
}

#[derive(Debug, Deserialize)]
struct MessReport {
    #[serde(default)]
    files: Vec<MessFile>,
}

#[derive(Debug, Deserialize)]
struct MessFile {
    file: String,
    #[serde(default)]
    violations: Vec<MessViolation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessViolation {
    begin_line: u64,
    end_line: u64,
    description: String,
}

/// Table rows from a phpmd JSON report
fn mess_rows(report: &str) -> serde_json::Result<Vec<Vec<String>>> {
    let report: MessReport = serde_json::from_str(report)?;
    Ok(report
        .files
        .iter()
        .flat_map(|file| {
            file.violations.iter().map(|violation| {
                vec![
                    violation.begin_line.to_string(),
                    violation.end_line.to_string(),
                    file.file.clone(),
                    violation.description.trim().to_string(),
                ]
            })
        })
        .collect())
}

/// Run code quality analysers
#[derive(Debug, Default)]
pub struct QcodeCommand;

impl QcodeCommand {
    /// Whether the analyser's program can run, reporting when it cannot
    fn available(ctx: &mut RuntimeContext<'_>, analyser: Analyser) -> bool {
        let Some(program) = analyser.program() else {
            return true;
        };
        let shell = ctx.shell;
        let installed = ctx
            .cache
            .flag_or_insert_with(&format!("which:{program}"), || shell.is_installed(program));
        if !installed {
            if analyser == Analyser::Security {
                ctx.console.error("curl command is required for this analyser.");
            } else {
                ctx.console.warning(&format!(
                    "{program} is not installed, skipping {}.",
                    analyser.title()
                ));
            }
        }
        installed
    }

    fn analyse(
        ctx: &mut RuntimeContext<'_>,
        analyser: Analyser,
        target: &Target<'_>,
    ) -> Result<()> {
        let path = target.path;
        match analyser {
            Analyser::Mess => Self::mess(ctx, path),
            Analyser::CopyPaste => {
                let out = ctx.shell.exec(&ShellCommand::new("phpcpd %s").arg(path))?;
                ctx.console.info(out.output.trim_end());
                Ok(())
            }
            Analyser::Lint => Self::stream(
                ctx,
                analyser,
                ShellCommand::new("parallel-lint %s").arg(path),
            ),
            Analyser::Security => {
                let command = ShellCommand::new(format!("curl -H %s {ADVISORIES_URL} -F %s"))
                    .arg("Accept: text/plain")
                    .arg(format!("lock=@{}", target.lock_file()));
                let out = ctx.shell.exec(&command)?;
                ctx.console.info(out.output.trim_end());
                Ok(())
            }
            Analyser::PhpStan => Self::phpstan(ctx, path),
            Analyser::Dephpend => Self::stream(
                ctx,
                analyser,
                ShellCommand::new("dephpend uml %s --keep-uml --output=%s.png --depth=3")
                    .arg(path)
                    .arg(DIAGRAM_NAME),
            ),
            Analyser::PhpInsights => Self::stream(
                ctx,
                analyser,
                ShellCommand::new("phpinsights analyse %s").arg(path),
            ),
        }
    }

    fn stream(
        ctx: &mut RuntimeContext<'_>,
        analyser: Analyser,
        command: ShellCommand,
    ) -> Result<()> {
        if !ctx.shell.exec_real_time(&command)? {
            ctx.console.warning(&format!("{} reported problems", analyser.title()));
        }
        Ok(())
    }

    fn mess(ctx: &mut RuntimeContext<'_>, path: &str) -> Result<()> {
        // phpmd exits non-zero when it finds violations
        let command = ShellCommand::new(format!("phpmd %s json {MESS_RULES}")).arg(path);
        let out = ctx.shell.exec(&command)?;

        match mess_rows(&out.output) {
            Ok(rows) if rows.is_empty() => ctx.console.success("No mess detected."),
            Ok(rows) => {
                let header = ["Begin line", "End line", "File", "Note"].map(String::from);
                ctx.console.table(&header, &rows);
            }
            Err(err) => {
                tracing::debug!(output = %out.output, "Unreadable phpmd report");
                ctx.console.error(&format!("Unable to read the phpmd report: {err}"));
            }
        }
        Ok(())
    }

    fn phpstan(ctx: &mut RuntimeContext<'_>, path: &str) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let site_root = format!("{}/", cwd.to_string_lossy().trim_end_matches('/'));
        let base = CodeBase::detect(&cwd);
        tracing::debug!(site_root = %site_root, base = %base, "Static analysis");

        let template = ctx
            .config
            .qcode
            .phpstan
            .get(base.as_str())
            .map_or(base.default_command(), String::as_str);
        if template.trim().is_empty() {
            ctx.console.error(&format!("There is no command to execute for base code: {base}"));
            return Ok(());
        }

        let command = expand_tokens(template, path, &site_root);
        Self::stream(ctx, Analyser::PhpStan, command)
    }
}

impl Command for QcodeCommand {
    fn descriptor() -> CommandDescriptor {
        let descriptor = CommandDescriptor::new(
            "qcode",
            "Check source code using tools such as Mess Detector, Copy/Paste Detector, \
             PHP Parallel Lint & Security Advisories.",
        )
        .argument(
            ArgumentSpec::optional("paths")
                .multiple()
                .help("List of relative paths."),
        );
        Analyser::ALL.into_iter().fold(descriptor, |descriptor, analyser| {
            descriptor.option(
                OptionSpec::flag(analyser.option())
                    .short(analyser.short())
                    .help(analyser.help()),
            )
        })
    }

    fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let paths = ctx.input.arguments("paths").to_vec();
        if paths.is_empty() {
            return Err(Error::MissingArgument("paths".into()).into());
        }
        let analysers = selected(&ctx.input);

        for path in &paths {
            ctx.console.write(Tone::Title, &format!("Analysing: {path}"));
            if !Path::new(path).exists() {
                ctx.console.warning(&format!("Path not found: {path}"));
                continue;
            }

            let target = Target::new(path);
            for &analyser in &analysers {
                if !analyser.applies_to(&target) {
                    continue;
                }
                ctx.console.write(Tone::Note, &format!("[ {} ]", analyser.title()));
                if Self::available(ctx, analyser) {
                    Self::analyse(ctx, analyser, &target)?;
                }
            }
        }
        Ok(())
    }
}
