//! CLI command implementations

pub mod commit;
pub mod csfixer;
pub mod faq;
pub mod qcode;

use crate::registry::Registry;

pub use commit::CommitCommand;
pub use csfixer::CsFixerCommand;
pub use faq::FaqCommand;
pub use qcode::QcodeCommand;

/// Registry with every built-in command
#[must_use]
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register::<CommitCommand>()
        .register::<FaqCommand>()
        .register::<CsFixerCommand>()
        .register::<QcodeCommand>();
    registry
}
