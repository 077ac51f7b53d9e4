//! The install command

use std::io::IsTerminal;

use colored::Colorize;
use optdeps_core::{
    CommandConfigurator, CommandInstaller, DefaultsPort, DownstreamNotifier, InteractionPort,
    ManifestDocument, OptionalInstall, RunMode, RunReport, SelectionOutcome,
};

use crate::context::ProjectContext;
use crate::error::{CliError, Result};
use crate::terminal::TerminalPort;

/// Run the install command
pub fn run_install(ctx: &ProjectContext, no_interaction: bool, dry_run: bool) -> Result<()> {
    let mut document = ManifestDocument::load(ctx.manifest_path())?;
    let mode = if dry_run {
        RunMode::DryRun
    } else {
        RunMode::Apply
    };

    let report = if no_interaction {
        execute(ctx, &mut document, DefaultsPort, mode)?
    } else {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::user(
                "stdin is not a terminal; rerun with --no-interaction for a minimal install",
            ));
        }
        execute(ctx, &mut document, TerminalPort, mode)?
    };

    print_report(&report);
    Ok(())
}

fn execute<P: InteractionPort>(
    ctx: &ProjectContext,
    document: &mut ManifestDocument,
    port: P,
    mode: RunMode,
) -> Result<RunReport> {
    let installer = CommandInstaller::from_settings(&ctx.settings, &ctx.root, document);
    let configurator = CommandConfigurator::new(ctx.settings.configure.command.clone(), &ctx.root);

    let mut run = OptionalInstall::new(
        &ctx.settings.tool_key,
        port,
        DownstreamNotifier::new(installer, configurator),
    );
    Ok(run.run(document, mode)?)
}

fn print_report(report: &RunReport) {
    if let Some(preview) = &report.preview {
        if preview.is_empty() {
            println!("{}", "No manifest changes.".dimmed());
        } else {
            print!("{preview}");
        }
        println!("{} dry run; nothing installed or written", "note:".yellow().bold());
        return;
    }

    match &report.outcome {
        SelectionOutcome::NoCandidates => {
            println!("{}", "No optional packages declared.".dimmed());
        }
        SelectionOutcome::Minimal | SelectionOutcome::NothingSelected => {
            println!(
                "{} Removed optional package declarations from the manifest.",
                "OK".green().bold()
            );
        }
        SelectionOutcome::Selected(_) => {
            println!(
                "{} Installed {}.",
                "OK".green().bold(),
                report.installed().join(", ").cyan()
            );
        }
    }
}
