//! Optional-dependency selection and manifest patching.
//!
//! A project template lists optional packages under `extra.<tool-key>` in its
//! manifest. This crate asks the user which of them to install, adds the
//! chosen ones to `require` / `require-dev`, hands them to an installer and a
//! configuration hook, and finally rewrites the manifest without the
//! declaration block.

pub mod command;
pub mod config;
pub mod constraint;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod manifest;
pub mod notifier;
pub mod package;
pub mod run;
pub mod selection;
pub mod spec;

pub use command::{CommandConfigurator, CommandInstaller};
pub use config::{SETTINGS_FILENAME, Settings};
pub use engine::{SelectionEngine, SelectionOutcome};
pub use error::{Error, Result};
pub use interaction::{DefaultsPort, InteractionPort, ScriptedPort, ask_yes_no};
pub use manifest::{ManifestDocument, ManifestPatcher, ManifestView};
pub use notifier::{Configurator, DownstreamNotifier, InstalledPackage, Installer, NoopConfigurator};
pub use package::OptionalPackage;
pub use run::{OptionalInstall, RunMode, RunReport};
pub use selection::Selection;
pub use spec::is_valid_spec;
