//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! Commands that talk to GitHub are async. Each handler creates its own
//! tokio runtime and blocks on the async implementation.

mod changelog;

pub use changelog::changelog;

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Changelog(args) => changelog(ctx, &args),
    }
}
