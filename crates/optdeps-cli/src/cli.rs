//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// optdeps - Pick optional packages declared by a project template
#[derive(Parser, Debug)]
#[command(name = "optdeps")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to optdeps.toml in the project root)
    #[arg(long, global = true, env = "OPTDEPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Manifest path, overriding the settings file
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Key under the manifest's `extra` node holding the declarations
    #[arg(long, global = true)]
    pub tool_key: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Choose optional packages, install them and update the manifest
    ///
    /// Examples:
    ///   optdeps install                    # Ask about each optional package
    ///   optdeps install --no-interaction   # Minimal install, no questions
    ///   optdeps install --dry-run          # Show the manifest diff only
    Install {
        /// Accept the default answer for every question
        #[arg(short = 'n', long)]
        no_interaction: bool,

        /// Preview changes without installing or writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List declared optional packages and whether they are valid
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
