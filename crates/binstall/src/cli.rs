//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// binstall - keep released binaries up to date
#[derive(Parser, Debug)]
#[command(name = "binstall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check for updates and install them
    Download(DownloadArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Directory of binary spec files (*.yaml, *.yml)
    pub dir: PathBuf,

    /// Only check for updates
    #[arg(long)]
    pub check: bool,

    /// Install without asking for confirmation
    #[arg(long)]
    pub nqa: bool,

    /// Show what would be installed without installing
    #[arg(long)]
    pub dry_run: bool,

    /// Number of binaries processed in parallel
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// GitHub token for API requests
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Skip these binaries (repeatable or comma-separated)
    #[arg(short, long = "exclude", value_name = "NAME", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Only process these binaries (repeatable or comma-separated)
    #[arg(short, long = "include", value_name = "NAME", value_delimiter = ',')]
    pub include: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
