//! Declarative command metadata
//!
//! A [`CommandDescriptor`] lists the name, help text, positional arguments,
//! options and shortcut options of a command. The registry turns it into a
//! clap subcommand and uses it again to read the parsed values back.

use clap::{Arg, ArgAction, ArgMatches};
use indexmap::IndexMap;

/// Positional argument of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    /// Argument name, also the field name it resolves to
    pub name: &'static str,
    /// Help text
    pub help: &'static str,
    /// Whether a value must end up resolved
    pub required: bool,
    /// Value used when nothing is given
    pub default: Option<&'static str>,
    /// Accepts one or more values
    pub multiple: bool,
    /// Question asked when the value is missing
    pub prompt: Option<&'static str>,
}

impl ArgumentSpec {
    fn new(name: &'static str, required: bool) -> Self {
        Self {
            name,
            help: "",
            required,
            default: None,
            multiple: false,
            prompt: None,
        }
    }

    /// A required argument
    #[must_use]
    pub fn required(name: &'static str) -> Self {
        Self::new(name, true)
    }

    /// An optional argument
    #[must_use]
    pub fn optional(name: &'static str) -> Self {
        Self::new(name, false)
    }

    /// Set the help text
    #[must_use]
    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Set the default value
    #[must_use]
    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Accept one or more values
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Ask `question` when the value is missing
    #[must_use]
    pub fn prompt(mut self, question: &'static str) -> Self {
        self.prompt = Some(question);
        self
    }

    fn to_arg(&self) -> Arg {
        // Arguments with a question are asked for instead of failing the parse
        let mut arg = Arg::new(self.name)
            .help(self.help)
            .required(self.required && self.prompt.is_none() && self.default.is_none());
        if self.multiple {
            arg = arg.num_args(1..).action(ArgAction::Append);
        }
        if let Some(default) = self.default {
            arg = arg.default_value(default);
        }
        arg
    }
}

/// Whether an option takes a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Boolean switch
    Flag,
    /// Takes a single value
    Value,
}

/// Named option of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Long name
    pub name: &'static str,
    /// Short alias
    pub short: Option<char>,
    /// Help text
    pub help: &'static str,
    /// Switch or valued option
    pub arity: Arity,
    /// Default for valued options
    pub default: Option<&'static str>,
}

impl OptionSpec {
    /// A boolean switch
    #[must_use]
    pub fn flag(name: &'static str) -> Self {
        Self {
            name,
            short: None,
            help: "",
            arity: Arity::Flag,
            default: None,
        }
    }

    /// An option taking a value
    #[must_use]
    pub fn value(name: &'static str) -> Self {
        Self {
            arity: Arity::Value,
            ..Self::flag(name)
        }
    }

    /// Set the short alias
    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Set the help text
    #[must_use]
    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Set the default value
    #[must_use]
    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name).long(self.name).help(self.help);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        match self.arity {
            Arity::Flag => arg.action(ArgAction::SetTrue),
            Arity::Value => {
                arg = arg.action(ArgAction::Set);
                if let Some(default) = self.default {
                    arg = arg.default_value(default);
                }
                arg
            }
        }
    }
}

/// Everything the registry needs to know about a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Subcommand name
    pub name: &'static str,
    /// One-line description
    pub about: String,
    /// Positional arguments, in order
    pub arguments: Vec<ArgumentSpec>,
    /// Named options
    pub options: Vec<OptionSpec>,
    /// Flags that switch the command to a predefined, non-interactive path
    pub shortcuts: Vec<&'static str>,
}

impl CommandDescriptor {
    /// Start a descriptor
    #[must_use]
    pub fn new(name: &'static str, about: impl Into<String>) -> Self {
        Self {
            name,
            about: about.into(),
            arguments: Vec::new(),
            options: Vec::new(),
            shortcuts: Vec::new(),
        }
    }

    /// Add a positional argument
    #[must_use]
    pub fn argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Add an option
    #[must_use]
    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Add a shortcut flag
    ///
    /// Shortcuts are checked in the order they are added.
    ///
    /// # Panics
    ///
    /// Panics if `option` takes a value.
    #[must_use]
    pub fn shortcut(mut self, option: OptionSpec) -> Self {
        assert_eq!(
            option.arity,
            Arity::Flag,
            "shortcut --{} must be a flag",
            option.name
        );
        self.shortcuts.push(option.name);
        self.options.push(option);
        self
    }

    /// Look up a positional argument
    #[must_use]
    pub fn find_argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Build the clap subcommand
    #[must_use]
    pub fn to_clap(&self) -> clap::Command {
        let command = clap::Command::new(self.name).about(self.about.clone());
        let command = self
            .arguments
            .iter()
            .fold(command, |command, argument| command.arg(argument.to_arg()));
        self.options
            .iter()
            .fold(command, |command, option| command.arg(option.to_arg()))
    }
}

/// Values parsed from the command line for one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    arguments: IndexMap<String, Vec<String>>,
    flags: IndexMap<String, bool>,
    values: IndexMap<String, String>,
}

impl ParsedInput {
    /// Empty input, as if nothing was given
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read back every declared argument and option of `descriptor`
    #[must_use]
    pub fn from_matches(descriptor: &CommandDescriptor, matches: &ArgMatches) -> Self {
        let mut input = Self::new();
        for argument in &descriptor.arguments {
            if let Some(values) = matches.get_many::<String>(argument.name) {
                input
                    .arguments
                    .insert(argument.name.to_string(), values.cloned().collect());
            }
        }
        for option in &descriptor.options {
            match option.arity {
                Arity::Flag => {
                    input
                        .flags
                        .insert(option.name.to_string(), matches.get_flag(option.name));
                }
                Arity::Value => {
                    if let Some(value) = matches.get_one::<String>(option.name) {
                        input.values.insert(option.name.to_string(), value.clone());
                    }
                }
            }
        }
        input
    }

    /// Set an argument value
    #[must_use]
    pub fn with_argument(mut self, name: &str, value: impl Into<String>) -> Self {
        self.arguments
            .entry(name.to_string())
            .or_default()
            .push(value.into());
        self
    }

    /// Set a flag
    #[must_use]
    pub fn with_flag(mut self, name: &str, on: bool) -> Self {
        self.flags.insert(name.to_string(), on);
        self
    }

    /// Set an option value
    #[must_use]
    pub fn with_value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// First value of an argument
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of an argument
    #[must_use]
    pub fn arguments(&self, name: &str) -> &[String] {
        self.arguments.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether a flag was set
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Value of an option
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// First of `shortcuts` that is switched on
    #[must_use]
    pub fn active_shortcut(&self, shortcuts: &[&'static str]) -> Option<&'static str> {
        shortcuts.iter().copied().find(|name| self.flag(name))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("greet", "Say hello")
            .argument(ArgumentSpec::optional("name").prompt("Who?"))
            .argument(ArgumentSpec::optional("extra").multiple())
            .option(OptionSpec::value("greeting").short('g').default_value("Hello"))
            .shortcut(OptionSpec::flag("world").short('w'))
            .shortcut(OptionSpec::flag("moon"))
    }

    fn parse(args: &[&str]) -> ParsedInput {
        let descriptor = descriptor();
        let matches = descriptor
            .to_clap()
            .try_get_matches_from(std::iter::once("greet").chain(args.iter().copied()))
            .unwrap();
        ParsedInput::from_matches(&descriptor, &matches)
    }

    #[test]
    fn test_reads_back_declared_values() {
        let input = parse(&["Ada", "x", "y", "-g", "Hi"]);

        assert_eq!(input.argument("name"), Some("Ada"));
        assert_eq!(input.arguments("extra"), ["x", "y"]);
        assert_eq!(input.value("greeting"), Some("Hi"));
        assert!(!input.flag("world"));
    }

    #[test]
    fn test_defaults_and_missing_values() {
        let input = parse(&[]);

        assert_eq!(input.argument("name"), None);
        assert!(input.arguments("extra").is_empty());
        assert_eq!(input.value("greeting"), Some("Hello"));
    }

    #[test]
    fn test_first_declared_shortcut_wins() {
        let input = parse(&["--moon", "-w"]);
        assert_eq!(input.active_shortcut(&descriptor().shortcuts), Some("world"));
        assert_eq!(parse(&[]).active_shortcut(&descriptor().shortcuts), None);
    }

    #[test]
    fn test_required_argument_without_question_fails_parse() {
        let descriptor =
            CommandDescriptor::new("fix", "Fix").argument(ArgumentSpec::required("path"));
        assert!(
            descriptor
                .to_clap()
                .try_get_matches_from(["fix"])
                .is_err()
        );
    }

    #[test]
    fn test_required_argument_with_question_parses() {
        let descriptor = CommandDescriptor::new("fix", "Fix")
            .argument(ArgumentSpec::required("path").prompt("Which path?"));
        assert!(
            descriptor
                .to_clap()
                .try_get_matches_from(["fix"])
                .is_ok()
        );
    }

    #[test]
    #[should_panic(expected = "must be a flag")]
    fn test_valued_shortcut_panics() {
        let _ = CommandDescriptor::new("x", "x").shortcut(OptionSpec::value("y"));
    }
}
