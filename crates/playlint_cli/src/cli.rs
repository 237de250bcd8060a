//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use playlint_core::Severity;

/// playlint - Rule-based source conformance checker
#[derive(Parser)]
#[command(name = "playlint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a project tree against a profile
    Check(CheckArgs),

    /// Inspect and verify rule sources
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct CheckArgs {
    /// Project root to check (defaults to the config's root, or ".")
    pub root: Option<PathBuf>,

    /// Profile to apply
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Only check files matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Skip files matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Rule source file (repeatable). Replaces the built-in playbooks
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: Vec<PathBuf>,

    /// Lowest severity that fails the run (error, warning, info)
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Stop after this many seconds and report what was found
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Worker threads (0 = all CPUs)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Maximum directory depth below the root
    #[arg(long, value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Do not follow symbolic links
    #[arg(long)]
    pub no_follow_links: bool,

    /// Check files ignored by .gitignore
    #[arg(long)]
    pub no_gitignore: bool,

    /// Check hidden files
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List the rules of a profile
    List {
        /// Profile to list
        #[arg(short, long)]
        profile: Option<String>,

        /// Rule source file (repeatable). Replaces the built-in playbooks
        #[arg(long = "rules", value_name = "FILE")]
        rules: Vec<PathBuf>,
    },

    /// Parse rule sources, compile every profile and check for conflicts
    Verify {
        /// Rule source files (defaults to the configured or built-in sources)
        files: Vec<PathBuf>,
    },
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
    Sarif,
}
