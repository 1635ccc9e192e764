//! Command registry and dispatcher
//!
//! Commands are registered once with their descriptor and a factory. The
//! dispatcher builds the clap command tree from the descriptors, picks the
//! command named on the command line and drives it through its lifecycle.

use crate::GlobalArgs;
use crate::command::Command;
use crate::common::{RuntimeContext, Services};
use crate::descriptor::{CommandDescriptor, ParsedInput};
use crate::error::Result;
use clap::{ArgMatches, Args};
use moo_config::Config;
use std::ffi::OsString;

/// Exit code of a successful command
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code of a command that failed in an expected way
pub const EXIT_FAILURE: u8 = 1;

/// Creates a fresh command instance
pub type Factory = fn() -> Box<dyn Command>;

/// Adjusts a descriptor to the loaded configuration
pub type Configure = fn(CommandDescriptor, &Config) -> CommandDescriptor;

struct Entry {
    descriptor: CommandDescriptor,
    configure: Configure,
    factory: Factory,
}

impl Entry {
    fn descriptor_for(&self, config: &Config) -> CommandDescriptor {
        (self.configure)(self.descriptor.clone(), config)
    }
}

/// Name-to-command table
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command type
    pub fn register<C>(&mut self) -> &mut Self
    where
        C: Command + Default + 'static,
    {
        self.insert(C::descriptor(), C::configure, create::<C>)
    }

    /// Register a descriptor with an explicit factory
    ///
    /// The descriptor is used as-is whatever the configuration.
    ///
    /// # Panics
    ///
    /// Panics if a command with the same name is already registered.
    pub fn register_with(&mut self, descriptor: CommandDescriptor, factory: Factory) -> &mut Self {
        self.insert(descriptor, keep, factory)
    }

    fn insert(
        &mut self,
        descriptor: CommandDescriptor,
        configure: Configure,
        factory: Factory,
    ) -> &mut Self {
        assert!(
            self.find(descriptor.name).is_none(),
            "command '{}' is registered twice",
            descriptor.name
        );
        self.entries.push(Entry {
            descriptor,
            configure,
            factory,
        });
        self
    }

    /// Registered command names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.descriptor.name)
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.descriptor.name == name)
    }

    /// The command tree for an empty configuration
    #[must_use]
    pub fn cli(&self) -> clap::Command {
        self.cli_with(&Config::default())
    }

    /// The command tree with every descriptor adjusted to `config`
    #[must_use]
    pub fn cli_with(&self, config: &Config) -> clap::Command {
        let root = clap::Command::new("moo")
            .about("Developer workflow helpers: standardised commits, code quality, FAQs")
            .version(clap::crate_version!())
            .subcommand_required(true)
            .arg_required_else_help(true);
        let root = GlobalArgs::augment_args(root);
        self.entries.iter().fold(root, |root, entry| {
            root.subcommand(entry.descriptor_for(config).to_clap())
        })
    }

    /// Parse `argv` and run the named command
    ///
    /// Parse failures (and `--help`/`--version`) are printed by clap and
    /// return clap's exit code.
    pub fn dispatch<I, T>(&self, argv: I, services: &mut Services) -> Result<u8>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match self.cli_with(&services.config).try_get_matches_from(argv) {
            Ok(matches) => self.dispatch_matches(&matches, services),
            Err(err) => {
                err.print()?;
                Ok(u8::try_from(err.exit_code()).unwrap_or(EXIT_FAILURE))
            }
        }
    }

    /// Run the command selected in already parsed `matches`
    ///
    /// `matches` must come from [`cli_with`](Self::cli_with) with the same
    /// configuration as `services`. Returns [`EXIT_SUCCESS`], or
    /// [`EXIT_FAILURE`] after reporting a handled error on the console.
    /// Unhandled errors are returned to the caller.
    pub fn dispatch_matches(&self, matches: &ArgMatches, services: &mut Services) -> Result<u8> {
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(anyhow::anyhow!("No command given").into());
        };
        let entry = self
            .find(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown command: {name}"))?;

        let descriptor = entry.descriptor_for(&services.config);
        let input = ParsedInput::from_matches(&descriptor, sub_matches);
        tracing::debug!(command = name, ?input, "Dispatching");

        let mut command = (entry.factory)();
        let mut ctx = RuntimeContext::new(&descriptor, input, services);

        match run_lifecycle(command.as_mut(), &mut ctx) {
            Ok(()) => Ok(EXIT_SUCCESS),
            Err(err) if err.is_handled() => {
                tracing::debug!(command = name, error = ?err, "Command failed");
                ctx.console.report_error(&err.to_string());
                Ok(EXIT_FAILURE)
            }
            Err(err) => Err(err),
        }
    }
}

fn create<C>() -> Box<dyn Command>
where
    C: Command + Default + 'static,
{
    Box::new(C::default())
}

fn keep(descriptor: CommandDescriptor, _config: &Config) -> CommandDescriptor {
    descriptor
}

fn run_lifecycle(command: &mut dyn Command, ctx: &mut RuntimeContext<'_>) -> Result<()> {
    command.initialize(ctx)?;
    command.interact(ctx)?;
    command.execute(ctx)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::descriptor::OptionSpec;
    use crate::error::CommandError;
    use moo_config::Config;
    use moo_core::{Error, ScriptedConsole, ScriptedShell, Tone};

    #[derive(Default)]
    struct Succeeds;

    impl Command for Succeeds {
        fn descriptor() -> CommandDescriptor {
            CommandDescriptor::new("ok", "Always succeeds")
        }

        fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
            ctx.console.success("done");
            Ok(())
        }
    }

    #[derive(Default)]
    struct Refuses;

    impl Command for Refuses {
        fn descriptor() -> CommandDescriptor {
            CommandDescriptor::new("refuse", "Always aborts")
        }

        fn initialize(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
            Err(Error::Aborted("Nothing to do.".into()).into())
        }

        fn execute(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
            panic!("execute must not run after a failed initialize");
        }
    }

    #[derive(Default)]
    struct Breaks;

    impl Command for Breaks {
        fn descriptor() -> CommandDescriptor {
            CommandDescriptor::new("break", "Fails unexpectedly")
        }

        fn execute(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    /// Accepts `--loud` only when FAQs are configured
    #[derive(Default)]
    struct Shout;

    impl Command for Shout {
        fn descriptor() -> CommandDescriptor {
            CommandDescriptor::new("shout", "Say something")
        }

        fn configure(descriptor: CommandDescriptor, config: &Config) -> CommandDescriptor {
            if config.faqs.is_empty() {
                descriptor
            } else {
                descriptor.option(OptionSpec::flag("loud"))
            }
        }

        fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
            let text = if ctx.input.flag("loud") { "HEY" } else { "hey" };
            ctx.console.success(text);
            Ok(())
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register::<Succeeds>()
            .register::<Refuses>()
            .register::<Breaks>()
            .register::<Shout>();
        registry
    }

    fn services(console: &ScriptedConsole) -> Services {
        Services::new(
            Box::new(console.clone()),
            Box::new(ScriptedShell::new()),
            Config::default(),
        )
    }

    #[test]
    fn test_success_exits_zero() {
        let console = ScriptedConsole::new();
        let code = registry()
            .dispatch(["moo", "ok"], &mut services(&console))
            .unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(console.lines_with(Tone::Success), vec!["done"]);
    }

    #[test]
    fn test_handled_error_is_reported_once() {
        let console = ScriptedConsole::new();
        let code = registry()
            .dispatch(["moo", "refuse"], &mut services(&console))
            .unwrap();

        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(console.lines_with(Tone::Error), vec!["Nothing to do."]);
    }

    #[test]
    fn test_unhandled_error_propagates() {
        let console = ScriptedConsole::new();
        let result = registry().dispatch(["moo", "break"], &mut services(&console));

        assert!(matches!(result, Err(CommandError::IoError(_))));
        assert!(console.lines_with(Tone::Error).is_empty());
    }

    #[test]
    fn test_unknown_command_is_a_usage_error() {
        let console = ScriptedConsole::new();
        let code = registry()
            .dispatch(["moo", "nope"], &mut services(&console))
            .unwrap();
        assert_eq!(code, 2);
    }

    #[test]
    fn test_names_in_registration_order() {
        assert_eq!(
            registry().names().collect::<Vec<_>>(),
            vec!["ok", "refuse", "break", "shout"]
        );
    }

    #[test]
    fn test_configured_option_is_parsed() {
        let console = ScriptedConsole::new();
        let config = Config::from_toml_str("[[faqs]]\nquestion = \"q\"\nanswer = \"a\"\n").unwrap();
        let mut services = Services::new(
            Box::new(console.clone()),
            Box::new(ScriptedShell::new()),
            config,
        );

        let code = registry()
            .dispatch(["moo", "shout", "--loud"], &mut services)
            .unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(console.lines_with(Tone::Success), vec!["HEY"]);
    }

    #[test]
    fn test_option_missing_without_configuration() {
        let console = ScriptedConsole::new();
        let code = registry()
            .dispatch(["moo", "shout", "--loud"], &mut services(&console))
            .unwrap();

        assert_eq!(code, 2);
        assert!(console.lines_with(Tone::Success).is_empty());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_name_panics() {
        let mut registry = registry();
        registry.register::<Succeeds>();
    }

    #[test]
    fn test_cli_tree_is_consistent() {
        registry().cli().debug_assert();
    }
}
