//! Common types shared across CLI commands

use crate::descriptor::{CommandDescriptor, ParsedInput};
use crate::error::Result;
use moo_config::Config;
use moo_core::{
    Console, FieldSource, PromptEngine, ResolvedArguments, Resolver, Shell, Step,
    ValidatorChain,
};
use moo_engine::LookupCache;
use std::sync::Arc;

/// Long-lived collaborators handed to every command
///
/// The binary fills this with the terminal console and real processes;
/// tests use scripted ones.
pub struct Services {
    /// Where messages go and answers come from
    pub console: Box<dyn Console>,
    /// Runs external programs
    pub shell: Box<dyn Shell>,
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Global `--verbose` switch
    pub verbose: bool,
}

impl Services {
    /// Bundle the collaborators
    pub fn new(console: Box<dyn Console>, shell: Box<dyn Shell>, config: Config) -> Self {
        Self {
            console,
            shell,
            config: Arc::new(config),
            verbose: false,
        }
    }

    /// Set the verbose switch
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Runtime context for one command invocation
///
/// Holds the parsed input and the arguments resolved so far, next to the
/// shared collaborators. The lookup cache lives exactly as long as the
/// invocation.
pub struct RuntimeContext<'a> {
    /// Shared configuration
    pub config: Arc<Config>,
    /// What was given on the command line
    pub input: ParsedInput,
    /// Field values settled so far
    pub resolved: ResolvedArguments,
    /// Console for messages and questions
    pub console: &'a mut dyn Console,
    /// Process runner
    pub shell: &'a dyn Shell,
    /// Per-invocation memoised lookups
    pub cache: LookupCache,
    /// Global `--verbose` switch
    pub verbose: bool,
    descriptor: &'a CommandDescriptor,
}

impl<'a> RuntimeContext<'a> {
    /// Create the context for running `descriptor` with `input`
    pub fn new(
        descriptor: &'a CommandDescriptor,
        input: ParsedInput,
        services: &'a mut Services,
    ) -> Self {
        Self {
            config: Arc::clone(&services.config),
            input,
            resolved: ResolvedArguments::new(),
            console: services.console.as_mut(),
            shell: services.shell.as_ref(),
            cache: LookupCache::new(),
            verbose: services.verbose,
            descriptor,
        }
    }

    /// Descriptor of the running command
    #[inline]
    pub fn descriptor(&self) -> &CommandDescriptor {
        self.descriptor
    }

    /// Prompt engine on this context's console with the configured ceiling
    pub fn prompt(&mut self) -> PromptEngine<'_> {
        PromptEngine::new(&mut *self.console).with_max_attempts(self.config.max_attempts())
    }

    /// Resolve the declared positional arguments
    ///
    /// Values given on the command line are validated with `validators`.
    /// Missing values are asked for when the argument declares a question;
    /// otherwise a required argument fails with a missing-argument error.
    pub fn resolve_declared_arguments(&mut self, validators: &ValidatorChain) -> Result<()> {
        let mut source = DeclaredArguments {
            descriptor: self.descriptor,
            input: &self.input,
        };
        Resolver::new(validators)
            .with_max_attempts(self.config.max_attempts())
            .run(&mut source, &mut *self.console, &mut self.resolved)?;
        Ok(())
    }
}

/// Generic field source over the positional arguments of a descriptor
///
/// Multi-valued arguments are left in the parsed input.
struct DeclaredArguments<'d> {
    descriptor: &'d CommandDescriptor,
    input: &'d ParsedInput,
}

impl FieldSource for DeclaredArguments<'_> {
    fn fields(&self) -> Vec<String> {
        self.descriptor
            .arguments
            .iter()
            .filter(|argument| !argument.multiple)
            .map(|argument| argument.name.to_string())
            .collect()
    }

    fn supplied(&self, field: &str) -> Option<String> {
        self.input.argument(field).map(ToString::to_string)
    }

    fn collect(
        &mut self,
        field: &str,
        _engine: &mut PromptEngine<'_>,
        _validators: &ValidatorChain,
    ) -> moo_core::Result<Step> {
        let Some(argument) = self.descriptor.find_argument(field) else {
            return Ok(Step::Skip);
        };
        Ok(match (argument.prompt, argument.default, argument.required) {
            (Some(question), default, _) => Step::Prompt {
                question: question.to_string(),
                default: default.map(ToString::to_string),
            },
            (None, Some(default), _) => Step::Value(default.to_string()),
            (None, None, true) => Step::Missing,
            (None, None, false) => Step::Skip,
        })
    }
}
