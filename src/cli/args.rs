//! Global command-line flags
//!
//! Registered once on the root command with `global = true`, so every
//! subcommand accepts them and clap propagates their values to all levels.

use std::path::PathBuf;

use clap::{Args, ValueHint};

use crate::domain::GlobalFlags;

/// Flags shared by the root command and every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Run in silent mode: only fatal errors are printed
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// Print the full error chain if a command fails
    #[arg(long, global = true)]
    pub debug: bool,

    /// The namespace to use
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// The kubernetes context to use
    #[arg(long, global = true)]
    pub kube_context: Option<String>,

    /// Switch kubectl context and namespace to the ones given
    #[arg(long, global = true)]
    pub switch_context: bool,

    /// Config file (default: ~/.devspace)
    #[arg(long, global = true, env = "DEVSPACE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

impl From<GlobalArgs> for GlobalFlags {
    fn from(args: GlobalArgs) -> Self {
        Self {
            silent: args.silent,
            debug: args.debug,
            namespace: args.namespace,
            kube_context: args.kube_context,
            switch_context: args.switch_context,
            config: args.config,
        }
    }
}
