//! optdeps CLI
//!
//! Asks which optional packages a project template should install, installs
//! them and updates the manifest.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod terminal;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use context::ProjectContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {e}", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command.clone() else {
        // No command provided - show help hint
        println!("{} optional package installer", "optdeps".green().bold());
        println!();
        println!("Run {} for available commands.", "optdeps --help".cyan());
        return Ok(());
    };

    match command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "optdeps", &mut std::io::stdout());
            Ok(())
        }
        Commands::Install {
            no_interaction,
            dry_run,
        } => {
            let ctx = resolve_context(&cli)?;
            commands::run_install(&ctx, no_interaction, dry_run)
        }
        Commands::List { json } => {
            let ctx = resolve_context(&cli)?;
            commands::run_list(&ctx, json)
        }
    }
}

fn resolve_context(cli: &Cli) -> Result<ProjectContext> {
    let cwd = std::env::current_dir()?;
    ProjectContext::resolve(&cwd, cli)
}
