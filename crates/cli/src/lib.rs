//! moo CLI library
//!
//! Commands are described by a [`descriptor::CommandDescriptor`], registered
//! in a [`registry::Registry`] and run through the `initialize`, `interact`,
//! `execute` lifecycle of [`command::Command`]. Everything a command touches
//! outside the process goes through a console and a shell, so the whole
//! flow can be driven from tests.

pub mod cmd;
pub mod command;
pub mod common;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod ui;

use anyhow::{Context, Result};
use clap::{ArgMatches, Args};
use moo_config::Config;
use moo_engine::DuctShell;
use std::ffi::OsString;
use std::path::PathBuf;

use common::Services;
use registry::Registry;
use ui::TerminalConsole;

/// Options accepted by every command
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Path to the user config file
    #[arg(long, env = "MOO_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the core config file, applied on top of the user config
    #[arg(long, env = "MOO_CORE_CONFIG", value_name = "FILE", global = true)]
    pub core_config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "MOO_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl GlobalArgs {
    /// Read the global options from a lenient first pass over `argv`
    ///
    /// The full command tree depends on the configuration these options
    /// point at, so arguments unknown to the default tree are ignored here.
    /// Values missing from the command line fall back to the environment.
    pub fn peek<I, T>(registry: &Registry, argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let Ok(matches) = registry
            .cli()
            .ignore_errors(true)
            .try_get_matches_from(argv)
        else {
            return Self::from_env();
        };

        Self {
            config: peek_path(&matches, "config", "MOO_CONFIG"),
            core_config: peek_path(&matches, "core_config", "MOO_CORE_CONFIG"),
            verbose: peek_flag(&matches, "verbose"),
            log_file: peek_path(&matches, "log_file", "MOO_LOG_FILE"),
        }
    }

    fn from_env() -> Self {
        Self {
            config: std::env::var_os("MOO_CONFIG").map(PathBuf::from),
            core_config: std::env::var_os("MOO_CORE_CONFIG").map(PathBuf::from),
            verbose: false,
            log_file: std::env::var_os("MOO_LOG_FILE").map(PathBuf::from),
        }
    }
}

// Globals given after the subcommand stay on the subcommand when the
// parse stops early
fn peek_path(matches: &ArgMatches, id: &str, env: &str) -> Option<PathBuf> {
    matches
        .get_one::<PathBuf>(id)
        .or_else(|| matches.subcommand().and_then(|(_, sub)| sub.get_one::<PathBuf>(id)))
        .cloned()
        .or_else(|| std::env::var_os(env).map(PathBuf::from))
}

fn peek_flag(matches: &ArgMatches, id: &str) -> bool {
    matches.get_one::<bool>(id).copied().unwrap_or(false)
        || matches
            .subcommand()
            .and_then(|(_, sub)| sub.get_one::<bool>(id).copied())
            .unwrap_or(false)
}

/// Load the layered configuration named by the global options
///
/// Without `--config` the user file is read from the XDG config home when it
/// exists. The core file is applied on top when present.
pub fn load_config(globals: &GlobalArgs) -> Result<Config> {
    let user = globals
        .config
        .clone()
        .or_else(|| moo_config::default_config_file().filter(|path| path.is_file()));
    let core = globals
        .core_config
        .clone()
        .unwrap_or_else(moo_config::default_core_config_file);

    Config::load_layered(user.as_deref(), Some(&core)).context("Failed to load configuration")
}

/// Run the command named in `argv` on the real terminal
///
/// The configuration is loaded first, so commands can add options that
/// depend on it before the command line is parsed for real. Returns the
/// process exit code. Errors are fatal startup or command failures that the
/// dispatcher did not handle.
pub fn run<I, T>(registry: &Registry, argv: I) -> Result<u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let globals = GlobalArgs::peek(registry, argv.iter().cloned());

    moo_config::logging::init(globals.verbose, globals.log_file.as_deref())?;

    let config = load_config(&globals)?;
    let mut services = Services::new(
        Box::new(TerminalConsole::new()),
        Box::new(DuctShell::new()),
        config,
    )
    .verbose(globals.verbose);

    Ok(registry.dispatch(argv, &mut services)?)
}
