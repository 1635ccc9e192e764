//! Command trait for moo CLI
//!
//! Every command runs through the same lifecycle: `initialize`, then
//! `interact`, then `execute`. The registry creates a fresh instance per
//! invocation, so commands may keep state between the three phases.

use crate::common::RuntimeContext;
use crate::descriptor::CommandDescriptor;
use crate::error::Result;
use moo_config::Config;
use moo_core::ValidatorChain;

/// Trait for all moo commands
///
/// # Example
///
/// ```rust,ignore
/// use moo::command::Command;
/// use moo::common::RuntimeContext;
/// use moo::descriptor::{ArgumentSpec, CommandDescriptor};
/// use moo::error::Result;
///
/// #[derive(Default)]
/// struct Greet;
///
/// impl Command for Greet {
///     fn descriptor() -> CommandDescriptor {
///         CommandDescriptor::new("greet", "Say hello")
///             .argument(ArgumentSpec::required("name").prompt("Who should I greet?"))
///     }
///
///     fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
///         let name = ctx.resolved.get("name").unwrap_or("world").to_string();
///         ctx.console.success(&format!("Hello {name}!"));
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// Name, help text, arguments and options
    fn descriptor() -> CommandDescriptor
    where
        Self: Sized;

    /// Adjust the descriptor to the loaded configuration
    ///
    /// Runs before the command line is parsed, so options added here are
    /// accepted by the parser. The default keeps the static descriptor.
    fn configure(descriptor: CommandDescriptor, _config: &Config) -> CommandDescriptor
    where
        Self: Sized,
    {
        descriptor
    }

    /// Validators applied to supplied and prompted values
    fn validators(&self) -> ValidatorChain {
        ValidatorChain::new()
    }

    /// Prepare state that depends on configuration
    fn initialize(&mut self, _ctx: &mut RuntimeContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Fill in missing input, asking the user where needed
    ///
    /// The default resolves the declared positional arguments.
    fn interact(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let validators = self.validators();
        ctx.resolve_declared_arguments(&validators)
    }

    /// Do the work
    fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()>;
}
