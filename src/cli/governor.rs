//! Execution governor: the single process entry point
//!
//! One invocation runs strictly in this order, without retries:
//! parse flags, run `STARTUP_STEPS`, run the selected command body, report
//! the outcome to analytics, map it to a `Termination`. Only `run()` ends the
//! process.

use std::ffi::OsString;
use std::panic;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::FromArgMatches;
use tracing::{debug, instrument, warn};

use crate::application::services::VersionNotifier;
use crate::cli::args::GlobalArgs;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::registry::{build_root_command, ActionContext, CommandNode};
use crate::config::{ConfigLoad, ConfigSource, ResolvedConfig, Settings};
use crate::domain::{GlobalFlags, SharedFlags, SkipReason, VersionCheck};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{Analytics, CommandEvent};
use crate::logging;

/// Steps run after flag parsing and before the command body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStep {
    /// Install the logger at the level chosen by `--silent`/`--debug`
    SilenceSetup,
    /// Compare against the latest release, warn if outdated
    VersionCheck,
    /// Locate and load the config file, apply environment overrides
    ConfigResolution,
}

/// Fixed order of startup steps; command bodies may rely on it.
pub const STARTUP_STEPS: [StartupStep; 3] = [
    StartupStep::SilenceSetup,
    StartupStep::VersionCheck,
    StartupStep::ConfigResolution,
];

/// Milestones of one invocation, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    FlagsParsed,
    Step(StartupStep),
    /// Upgrade hint shown to the user
    Warned(String),
    CommandExecuted,
    Reported,
}

/// How the process ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub code: i32,
    /// Printed to stderr before exiting; `None` on success
    pub message: Option<String>,
}

impl Termination {
    pub fn success() -> Self {
        Self {
            code: exitcode::OK,
            message: None,
        }
    }

    /// Terse single line, or the full cause chain in debug mode.
    pub fn failure(error: &CliError, debug: bool) -> Self {
        let message = if debug {
            error.detailed()
        } else {
            error.terse()
        };
        Self {
            code: error.exit_code(),
            message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == exitcode::OK
    }
}

/// Everything observable about one invocation.
#[derive(Debug, Clone)]
pub struct Execution {
    pub termination: Termination,
    pub phases: Vec<Phase>,
    /// Subcommand path, e.g. `devspace add port`
    pub command: String,
    pub version_check: Option<VersionCheck>,
    pub config: Option<ResolvedConfig>,
}

/// Runs the command tree with its collaborators.
pub struct Governor {
    services: ServiceContainer,
    flags: SharedFlags,
    root: CommandNode,
}

impl Governor {
    /// Governor with the built-in command tree.
    pub fn new(services: ServiceContainer) -> Self {
        let flags = SharedFlags::new();
        let root = build_root_command(&flags);
        Self::with_root(services, flags, root)
    }

    /// Governor with a custom tree; `flags` must be the handle the tree was built with.
    pub fn with_root(services: ServiceContainer, flags: SharedFlags, root: CommandNode) -> Self {
        Self {
            services,
            flags,
            root,
        }
    }

    pub fn flags(&self) -> &SharedFlags {
        &self.flags
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Run one invocation and describe how the process should end.
    #[instrument(skip_all)]
    pub fn execute<I, T>(&mut self, args: I) -> Execution
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.root.set_version(&self.services.version);

        let mut phases = Vec::new();
        let command = self.root.to_clap();
        let root_name = self.root.name().to_string();

        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let matches = match command.try_get_matches_from(&args) {
            Ok(matches) => matches,
            Err(e) if is_informational(e.kind()) => {
                // --help, --version, bare group: print and succeed
                if let Err(io) = e.print() {
                    debug!("cannot print help: {}", io);
                }
                return self.finish(root_name, Ok(()), phases, None, None);
            }
            Err(e) => {
                // flags were not parsed; honour --debug for the usage message
                if requests_debug(&args) {
                    self.flags.store(GlobalFlags {
                        debug: true,
                        ..GlobalFlags::default()
                    });
                }
                return self.finish(root_name, Err(e.into()), phases, None, None);
            }
        };

        match GlobalArgs::from_arg_matches(&matches) {
            Ok(args) => self.flags.store(GlobalFlags::from(args)),
            Err(e) => return self.finish(root_name, Err(e.into()), phases, None, None),
        }
        phases.push(Phase::FlagsParsed);

        let (node, leaf_matches, path) = self.root.resolve(&matches);
        let command_path = path.join(" ");
        debug!("selected command: {}", command_path);

        let mut version_check = VersionCheck::Skipped(SkipReason::DevBuild);
        let mut resolved = None;

        for step in STARTUP_STEPS {
            phases.push(Phase::Step(step));
            match step {
                StartupStep::SilenceSetup => {
                    logging::init(&self.flags.get());
                }
                StartupStep::VersionCheck => {
                    version_check = self.check_version();
                    let silent = self.flags.get().silent;
                    if let Some(warning) = version_check.warning().filter(|_| !silent) {
                        output::warning(&warning);
                        phases.push(Phase::Warned(warning));
                    }
                }
                StartupStep::ConfigResolution => match self.resolve_config() {
                    Ok(config) => resolved = Some(config),
                    Err(e) => {
                        return Self::report(
                            &self.services.analytics,
                            &self.flags,
                            command_path,
                            Err(e),
                            phases,
                            Some(version_check),
                            None,
                        );
                    }
                },
            }
        }

        let settings = resolved
            .as_ref()
            .map(|r| r.settings.clone())
            .unwrap_or_default();
        let ctx = ActionContext {
            flags: &self.flags,
            settings: &settings,
            matches: leaf_matches,
            version_check: &version_check,
        };
        let result = node.run(&ctx).map_err(CliError::Command);
        phases.push(Phase::CommandExecuted);

        Self::report(
            &self.services.analytics,
            &self.flags,
            command_path,
            result,
            phases,
            Some(version_check),
            resolved,
        )
    }

    fn check_version(&self) -> VersionCheck {
        let notifier = VersionNotifier::new(
            self.services.version.clone(),
            Arc::clone(&self.services.releases),
        );
        notifier.check()
    }

    fn resolve_config(&self) -> CliResult<ResolvedConfig> {
        let explicit = self.flags.get().config.clone();
        let resolved = Settings::resolve(
            explicit.as_deref(),
            self.services.home.as_ref(),
            self.services.env.clone(),
        )?;

        if let (ConfigSource::Explicit(path), ConfigLoad::NotFound) =
            (&resolved.source, &resolved.load)
        {
            warn!("Config file {} does not exist, using defaults", path.display());
        }
        Ok(resolved)
    }

    fn finish(
        &self,
        command: String,
        result: CliResult<()>,
        phases: Vec<Phase>,
        version_check: Option<VersionCheck>,
        config: Option<ResolvedConfig>,
    ) -> Execution {
        Self::report(
            &self.services.analytics,
            &self.flags,
            command,
            result,
            phases,
            version_check,
            config,
        )
    }

    /// Send the analytics event (exactly once) and map the outcome.
    fn report(
        analytics: &Arc<dyn Analytics>,
        flags: &SharedFlags,
        command: String,
        result: CliResult<()>,
        mut phases: Vec<Phase>,
        version_check: Option<VersionCheck>,
        config: Option<ResolvedConfig>,
    ) -> Execution {
        let event = CommandEvent {
            command: command.clone(),
            error: result.as_ref().err().map(CliError::terse),
        };
        analytics.send_command_event(&event);
        phases.push(Phase::Reported);

        let termination = match &result {
            Ok(()) => Termination::success(),
            Err(e) => Termination::failure(e, flags.get().debug),
        };

        Execution {
            termination,
            phases,
            command,
            version_check,
            config,
        }
    }
}

/// `--debug` anywhere before a `--` terminator.
fn requests_debug(args: &[OsString]) -> bool {
    args.iter()
        .skip(1)
        .take_while(|arg| arg.as_os_str() != "--")
        .any(|arg| arg.as_os_str() == "--debug")
}

fn is_informational(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// Forward unrecovered panics to analytics, then run the previous hook.
pub fn install_panic_hook(analytics: Arc<dyn Analytics>) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        analytics.report_panic(&info.to_string());
        previous(info);
    }));
}

/// Process entry point: runs the built-in tree on `std::env::args` and exits.
pub fn run() -> ! {
    let services = ServiceContainer::new();
    install_panic_hook(Arc::clone(&services.analytics));

    let mut governor = Governor::new(services);
    let execution = governor.execute(std::env::args_os());

    let termination = execution.termination;
    if let Some(message) = &termination.message {
        output::error(message);
    }
    std::process::exit(termination.code)
}
