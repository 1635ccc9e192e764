//! Terminal user interface

pub mod output;

pub use output::TerminalConsole;
