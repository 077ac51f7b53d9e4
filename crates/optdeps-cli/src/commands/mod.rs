//! Command implementations for optdeps-cli

pub mod install;
pub mod list;

pub use install::run_install;
pub use list::run_list;
