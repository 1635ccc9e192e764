//! Configuration management for moo
//!
//! This crate handles:
//! - Loading the user configuration and the optional core overrides
//! - Typed access to commit, prompt, FAQ and code style settings
//! - XDG directory management
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod logging;

// Re-export error types from core
pub use moo_core::{Error, Result};

// Re-export main types
pub use config::{
    CommitConfig, CommitStyleName, Config, CsFixerConfig, FaqEntry, PromptConfig, QcodeConfig,
};
pub use dirs::{config_dir, default_config_file, default_core_config_file};
