//! CLI layer: command tree, flag parsing and process entry

pub mod args;
pub mod commands;
pub mod error;
pub mod governor;
pub mod output;
pub mod registry;

pub use args::GlobalArgs;
pub use error::{CliError, CliResult};
pub use governor::{run, Execution, Governor, Phase, StartupStep, Termination, STARTUP_STEPS};
pub use registry::{build_root_command, build_root_with, ActionContext, CommandNode};
