//! # moo engine
//!
//! Side-effecting collaborators used by moo commands:
//!
//! - **Shell**: runs [`ShellCommand`](moo_core::ShellCommand) templates as
//!   real processes, captured or streamed
//! - **Cache**: read-through memoisation of expensive lookups for the
//!   lifetime of one command invocation

pub mod cache;
pub mod shell;

// Re-export error types from core
pub use moo_core::{Error, Result};

pub use cache::LookupCache;
pub use shell::DuctShell;
