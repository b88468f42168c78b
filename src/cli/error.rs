//! CLI-level errors (wraps infrastructure errors)

use std::error::Error as _;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Infra(#[from] InfraError),

    /// Command line could not be parsed
    #[error("{message}")]
    Usage { message: String, detail: String },

    /// A subcommand body failed; its category is not inspected
    #[error("{0}")]
    Command(anyhow::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(e.into())
    }
}

impl From<clap::Error> for CliError {
    fn from(e: clap::Error) -> Self {
        let detail = e.render().to_string();
        let message = detail
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();
        Self::Usage { message, detail }
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => crate::exitcode::USAGE,
            CliError::Command(_) => crate::exitcode::FAILURE,
            CliError::Infra(e) => match e {
                InfraError::Application(_) => crate::exitcode::CONFIG,
                InfraError::Release { .. } => crate::exitcode::FAILURE,
            },
        }
    }

    /// Single line for the user.
    pub fn terse(&self) -> String {
        self.to_string().lines().next().unwrap_or_default().to_string()
    }

    /// Message with the full cause chain (and backtrace, if captured).
    pub fn detailed(&self) -> String {
        match self {
            CliError::Command(e) => format!("{e:?}"),
            CliError::Usage { detail, .. } => detail.trim_end().to_string(),
            CliError::Infra(_) => {
                let mut out = self.to_string();
                let mut last = out.clone();
                let mut source = self.source();
                // transparent wrappers repeat their inner message; skip those
                while let Some(cause) = source {
                    let text = cause.to_string();
                    if text != last {
                        out.push_str(&format!("\n\nCaused by:\n    {text}"));
                    }
                    last = text;
                    source = cause.source();
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn given_command_error_with_context_when_rendering_then_terse_hides_cause() {
        let err = CliError::Command(anyhow!("connection refused").context("deploy failed"));

        assert_eq!(err.terse(), "deploy failed");
        let detailed = err.detailed();
        assert!(detailed.contains("deploy failed"));
        assert!(detailed.contains("connection refused"));
        assert_eq!(err.exit_code(), crate::exitcode::FAILURE);
    }

    #[test]
    fn given_home_dir_error_then_config_exit_code() {
        let err: CliError = ApplicationError::HomeDirUnavailable.into();
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
        assert_eq!(err.terse(), "cannot determine home directory");
        assert_eq!(err.detailed(), "cannot determine home directory");
    }

    #[test]
    fn given_multiline_message_when_terse_then_first_line_only() {
        let err = CliError::Command(anyhow!("first line\nsecond line"));
        assert_eq!(err.terse(), "first line");
    }
}
