//! One complete optional-install run.
//!
//! Order matters: the manifest is written last, so a failed install leaves
//! the file exactly as it was.

use crate::engine::{SelectionEngine, SelectionOutcome};
use crate::error::Result;
use crate::interaction::InteractionPort;
use crate::manifest::{ManifestDocument, ManifestPatcher};
use crate::notifier::{Configurator, DownstreamNotifier, Installer};

/// Whether a run may touch the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Apply,
    /// Prompt and patch in memory only; report a diff instead of installing.
    DryRun,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: SelectionOutcome,
    pub manifest_written: bool,
    /// Unified diff of the manifest, for dry runs.
    pub preview: Option<String>,
}

impl RunReport {
    /// Names of the packages that were (or in a dry run, would be) installed.
    pub fn installed(&self) -> Vec<String> {
        self.outcome.selection().whitelist()
    }
}

/// Selection, patching, installation and write, in that order.
pub struct OptionalInstall<P, I, C> {
    engine: SelectionEngine<P>,
    patcher: ManifestPatcher,
    notifier: DownstreamNotifier<I, C>,
}

impl<P, I, C> OptionalInstall<P, I, C>
where
    P: InteractionPort,
    I: Installer,
    C: Configurator,
{
    pub fn new(tool_key: impl Into<String>, port: P, notifier: DownstreamNotifier<I, C>) -> Self {
        Self {
            engine: SelectionEngine::new(port),
            patcher: ManifestPatcher::new(tool_key),
            notifier,
        }
    }

    pub fn port(&self) -> &P {
        self.engine.port()
    }

    pub fn notifier(&self) -> &DownstreamNotifier<I, C> {
        &self.notifier
    }

    pub fn run(&mut self, document: &mut ManifestDocument, mode: RunMode) -> Result<RunReport> {
        let declarations = document.view().declarations(self.patcher.tool_key());
        let outcome = self.engine.select(&declarations)?;

        if outcome == SelectionOutcome::NoCandidates {
            tracing::info!(
                tool_key = self.patcher.tool_key(),
                "no optional packages declared; nothing to do"
            );
            return Ok(RunReport {
                outcome,
                manifest_written: false,
                preview: None,
            });
        }

        let selection = outcome.selection();
        let patched = self.patcher.patch(document.view(), &selection);

        if mode == RunMode::DryRun {
            let preview = document.diff(&patched)?;
            return Ok(RunReport {
                outcome,
                manifest_written: false,
                preview: Some(preview),
            });
        }

        if !selection.is_empty() {
            self.notifier.notify(&selection, &patched)?;
        }

        document.save(&patched)?;
        Ok(RunReport {
            outcome,
            manifest_written: true,
            preview: None,
        })
    }
}
