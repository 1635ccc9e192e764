//! XDG directory utilities
//!
//! moo keeps its user configuration under the XDG config home:
//! - `XDG_CONFIG_HOME` defaults to ~/.config
//!
//! The core configuration is installed system wide and is not per user.

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Location of the core configuration when `MOO_CORE_CONFIG` is not set
pub const DEFAULT_CORE_CONFIG: &str = "/etc/moo/core.toml";

/// Get the moo config directory
///
/// Returns `$XDG_CONFIG_HOME/moo` or `~/.config/moo`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    BaseDirectories::with_prefix("moo").get_config_home()
}

/// Get the default user config file path
///
/// Returns `$XDG_CONFIG_HOME/moo/config.toml` or `~/.config/moo/config.toml`
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Get the default core config file path
#[must_use]
pub fn default_core_config_file() -> PathBuf {
    PathBuf::from(DEFAULT_CORE_CONFIG)
}
