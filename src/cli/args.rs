//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Only log errors

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tagnotes - Release changelogs from closed issues, merged pull requests
/// and registry notes
#[derive(Parser, Debug)]
#[command(name = "tagnotes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if tagnotes was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the changelog of a release
    #[command(
        name = "changelog",
        long_about = "Print the changelog of a release.\n\n\
            Collects the issues closed and pull requests merged since the previous \
            release, plus any custom notes from the registry pull request, and renders \
            them as Markdown on stdout.",
        after_help = "\
EXAMPLES:
    # Changelog for the release tagged v1.2.3 at the current commit
    tagnotes changelog v1.2.3 $(git rev-parse HEAD)

    # Explicit repository and a custom template
    tagnotes changelog v1.2.3 abc123 --repo Me/PkgName.jl --template-file notes.j2"
    )]
    Changelog(ChangelogArgs),
}

/// Arguments of `tagnotes changelog`.
#[derive(Args, Debug, Clone)]
pub struct ChangelogArgs {
    /// Release version, e.g. v1.2.3
    pub version: String,

    /// Commit the release points at
    pub sha: String,

    /// Package repository as owner/name (default: the origin remote)
    #[arg(long, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Registry repository as owner/name
    #[arg(long, value_name = "OWNER/NAME")]
    pub registry: Option<String>,

    /// Template file to render with
    #[arg(long, value_name = "PATH")]
    pub template_file: Option<PathBuf>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}
