//! Shared test utilities for the optdeps workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for a
//!   temporary project with a manifest and optional settings file

pub mod project;

pub use project::{TOOL_KEY, TestProject, sample_declarations};
