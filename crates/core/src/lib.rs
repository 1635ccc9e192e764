//! Core types and input resolution for moo
//!
//! This is the foundation crate (Layer 0) that all other moo crates depend on.
//! It provides:
//! - Base error types
//! - The console abstraction every prompt and message goes through
//! - The validator chain applied to user answers
//! - The prompt engine with its bounded retry policy
//! - The argument resolution state machine
//! - Shell command templates and the external process interface
//!
//! This crate has no dependencies on other moo crates.

pub mod console;
pub mod error;
pub mod prompt;
pub mod resolve;
pub mod traits;
pub mod validate;

pub use console::{Console, ScriptedConsole, Tone};
pub use error::{Error, Result, ValidationError};
pub use prompt::{DEFAULT_MAX_ATTEMPTS, PromptEngine};
pub use resolve::{
    Bypass, FieldOutcome, FieldSource, Resolution, ResolutionState, ResolvedArguments, Resolver,
    Step,
};
pub use traits::{ProcessOutput, ScriptedShell, Shell, ShellCommand};
pub use validate::{Rule, ValidatorChain};
