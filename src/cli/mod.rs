//! cli
//!
//! Command-line interface layer for tagnotes.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It wires configuration, the local repository and
//! GitHub clients together and hands them to [`crate::changelog`].
//!
//! Logs go to stderr so that stdout carries only the changelog.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors
    Normal,
    /// Everything down to debug
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Debug => "debug",
        }
    }
}

/// Execution context shared by command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory to run in (defaults to the process working directory)
    pub cwd: Option<PathBuf>,
    pub verbosity: Verbosity,
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over the verbosity flags.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));

    // A subscriber may already be set when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        cwd: cli.cwd.clone(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };
    init_logging(ctx.verbosity);

    commands::dispatch(cli.command, &ctx)
}
