//! devspace command-line entry layer
//!
//! Registers the subcommand tree, resolves configuration precedence, checks
//! for newer releases and owns the error/exit policy of the `devspace` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod logging;
pub mod util;
