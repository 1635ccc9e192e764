//! Argument resolution
//!
//! A command declares an ordered list of input fields through a
//! [`FieldSource`]. The [`Resolver`] walks them in order and settles each one
//! with the first step that produces an answer:
//!
//! 1. a value already present in the [`ResolvedArguments`] (first writer wins)
//! 2. an active shortcut ([`FieldSource::bypass`])
//! 3. a value supplied on the command line ([`FieldSource::supplied`]),
//!    accepted only if the validator chain accepts it
//! 4. the source's own collector ([`FieldSource::collect`]), which may prompt
//!    on its own or hand back a generic question
//! 5. the generic validated prompt

use crate::console::Console;
use crate::error::{Error, Result};
use crate::prompt::{DEFAULT_MAX_ATTEMPTS, PromptEngine};
use crate::validate::ValidatorChain;
use indexmap::IndexMap;

/// Field values settled for one command invocation
///
/// Values are never overwritten: the first step that sets a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArguments {
    values: IndexMap<String, String>,
}

impl ResolvedArguments {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` unless it already has a value
    ///
    /// Returns `false` when the field was already set and the value was
    /// discarded.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> bool {
        let field = field.into();
        if self.values.contains_key(&field) {
            return false;
        }
        self.values.insert(field, value.into());
        true
    }

    /// Value of `field`, if resolved
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Whether `field` has a value
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Number of resolved fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been resolved yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fields and values in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Shortcut decision for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bypass {
    /// No shortcut governs this field
    Inactive,
    /// A shortcut supplies this value, no prompt is shown
    Value(String),
    /// A shortcut is active and the field is left empty without prompting
    Suppressed,
}

/// What a field source's collector decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The collector produced a value
    Value(String),
    /// No value, skip the field
    Skip,
    /// Fall through to the generic validated prompt
    Prompt {
        /// Question shown before reading the answer
        question: String,
        /// Answer used when the user just presses enter
        default: Option<String>,
    },
    /// The field is required and nothing can provide it
    Missing,
}

/// How a field was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Already set, or supplied on the command line
    Preset,
    /// Settled by an active shortcut
    Bypassed,
    /// Settled by the source's own collector
    CustomCollected,
    /// Answered through the generic prompt
    Prompted,
    /// Left without a value
    Skipped,
}

/// Resolver progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Nothing resolved yet
    Idle,
    /// Working on the field at this index
    ResolvingField(usize),
    /// Every field settled
    AllResolved,
    /// A field exhausted its attempts or a required value was missing
    AbortedByValidation,
    /// The user declined at a confirmation gate
    AbortedByUser,
}

/// Provider of the fields a command needs
///
/// Only [`fields`](FieldSource::fields) and [`collect`](FieldSource::collect)
/// are required; the other hooks default to doing nothing.
pub trait FieldSource {
    /// Field names in resolution order
    fn fields(&self) -> Vec<String>;

    /// Value given for `field` on the command line
    fn supplied(&self, _field: &str) -> Option<String> {
        None
    }

    /// Shortcut decision for `field`
    fn bypass(&self, _field: &str) -> Bypass {
        Bypass::Inactive
    }

    /// Called right before `field` is collected interactively
    fn before_input(&mut self, _field: &str, _console: &mut dyn Console) -> Result<()> {
        Ok(())
    }

    /// Collect `field`, or describe the generic question to ask for it
    fn collect(
        &mut self,
        field: &str,
        engine: &mut PromptEngine<'_>,
        validators: &ValidatorChain,
    ) -> Result<Step>;
}

/// Outcome of a resolver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// How each field was settled, in order
    pub outcomes: IndexMap<String, FieldOutcome>,
    /// Final state
    pub state: ResolutionState,
}

impl Resolution {
    /// How `field` was settled
    #[must_use]
    pub fn outcome(&self, field: &str) -> Option<FieldOutcome> {
        self.outcomes.get(field).copied()
    }
}

/// Drives a [`FieldSource`] to a complete [`ResolvedArguments`]
#[derive(Debug)]
pub struct Resolver<'v> {
    validators: &'v ValidatorChain,
    max_attempts: usize,
    state: ResolutionState,
}

impl<'v> Resolver<'v> {
    /// Create a resolver validating answers with `validators`
    pub fn new(validators: &'v ValidatorChain) -> Self {
        Self {
            validators,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            state: ResolutionState::Idle,
        }
    }

    /// Override the attempt ceiling of every prompt
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Current state
    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Settle every field of `source` into `resolved`
    ///
    /// On failure the state records why resolution stopped and the error is
    /// returned unchanged.
    pub fn run(
        &mut self,
        source: &mut dyn FieldSource,
        console: &mut dyn Console,
        resolved: &mut ResolvedArguments,
    ) -> Result<Resolution> {
        let mut engine = PromptEngine::new(console).with_max_attempts(self.max_attempts);
        let mut outcomes = IndexMap::new();

        for (index, field) in source.fields().into_iter().enumerate() {
            self.state = ResolutionState::ResolvingField(index);
            match self.resolve_field(&field, source, &mut engine, resolved) {
                Ok(outcome) => {
                    tracing::debug!(field = %field, ?outcome, "Field resolved");
                    outcomes.insert(field, outcome);
                }
                Err(err) => {
                    self.state = match err {
                        Error::TooManyAttempts { .. } | Error::MissingArgument(_) => {
                            ResolutionState::AbortedByValidation
                        }
                        Error::Aborted(_) => ResolutionState::AbortedByUser,
                        _ => self.state,
                    };
                    return Err(err);
                }
            }
        }

        self.state = ResolutionState::AllResolved;
        Ok(Resolution {
            outcomes,
            state: self.state,
        })
    }

    fn resolve_field(
        &self,
        field: &str,
        source: &mut dyn FieldSource,
        engine: &mut PromptEngine<'_>,
        resolved: &mut ResolvedArguments,
    ) -> Result<FieldOutcome> {
        let validators = self.validators;

        if resolved.contains(field) {
            return Ok(FieldOutcome::Preset);
        }

        match source.bypass(field) {
            Bypass::Value(value) => {
                resolved.insert(field, value);
                return Ok(FieldOutcome::Bypassed);
            }
            Bypass::Suppressed => return Ok(FieldOutcome::Bypassed),
            Bypass::Inactive => {}
        }

        if let Some(raw) = source.supplied(field) {
            match validators.validate(field, &raw, engine.console()) {
                Ok(value) => {
                    resolved.insert(field, value);
                    return Ok(FieldOutcome::Preset);
                }
                Err(rejection) => engine.console().error(&rejection.message),
            }
        }

        source.before_input(field, engine.console())?;

        match source.collect(field, engine, validators)? {
            Step::Value(value) => {
                resolved.insert(field, value);
                Ok(FieldOutcome::CustomCollected)
            }
            Step::Skip => Ok(FieldOutcome::Skipped),
            Step::Missing => Err(Error::MissingArgument(field.to_string())),
            Step::Prompt { question, default } => {
                let value = engine.ask_validated(field, &question, default.as_deref(), |v, c| {
                    validators.validate(field, v, c)
                })?;
                resolved.insert(field, value);
                Ok(FieldOutcome::Prompted)
            }
        }
    }
}
