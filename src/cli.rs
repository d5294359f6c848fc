//! Command-line definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the project settings copier.
#[derive(Parser, Debug)]
#[command(
    name = "project-settings",
    about = "Copy IDE settings files into a project from dependency archives or the filesystem",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Run configuration file (defaults to ./project-settings.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve and copy the configured settings files
    Apply(ApplyOpts),
    /// Print version information
    Version,
}

/// Options for the `apply` subcommand.
///
/// Every option overrides the value read from the configuration file.
#[derive(Parser, Debug, Clone, Default)]
pub struct ApplyOpts {
    /// Where settings are found: `jar[:<prefix>]` or `file[:<dir>]`
    #[arg(long)]
    pub source: Option<String>,

    /// Space separated packaging filter, `!` excludes (e.g. "!pom")
    #[arg(long)]
    pub packagings: Option<String>,

    /// Fail the run when a file cannot be copied
    #[arg(long, value_name = "BOOL")]
    pub fail_on_error: Option<bool>,

    /// Skip project settings configuration entirely
    #[arg(long)]
    pub skip: bool,

    /// Preview changes without writing any file
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Append every written file to this list (incremental build integration)
    #[arg(long, value_name = "PATH")]
    pub changed_list: Option<PathBuf>,
}
