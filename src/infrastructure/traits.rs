//! I/O boundary traits for testability
//!
//! These traits abstract the collaborators the entry layer talks to, allowing
//! the governor and its services to be tested with fake implementations.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error};

use crate::infrastructure::{InfraError, InfraResult};

/// Home directory lookup.
pub trait HomeDirProvider: Send + Sync {
    /// Home directory of the invoking user, `None` if it cannot be determined.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Source of the latest published release.
pub trait ReleaseSource: Send + Sync {
    /// Latest stable version string (e.g. `v4.2.0`).
    fn latest_version(&self) -> InfraResult<String>;
}

/// Record of one finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    /// Space separated subcommand path, e.g. `add deployment`
    pub command: String,
    /// Terse error message, `None` on success
    pub error: Option<String>,
}

/// Usage analytics sink.
pub trait Analytics: Send + Sync {
    /// Record the outcome of the invocation. Called exactly once per run.
    fn send_command_event(&self, event: &CommandEvent);

    /// Record a panic that is about to terminate the process.
    fn report_panic(&self, message: &str);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Home directory from the platform conventions (`$HOME`, profile dir, ...).
#[derive(Debug, Default)]
pub struct SystemHomeDir;

impl HomeDirProvider for SystemHomeDir {
    fn home_dir(&self) -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }
}

const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/devspace-cloud/devspace/releases/latest";

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Latest release from the GitHub releases API.
#[derive(Debug)]
pub struct GithubReleaseSource {
    url: String,
    timeout: Duration,
}

impl Default for GithubReleaseSource {
    fn default() -> Self {
        Self {
            url: LATEST_RELEASE_URL.to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

impl GithubReleaseSource {
    /// Query a different endpoint (mirrors, enterprise installs).
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl ReleaseSource for GithubReleaseSource {
    fn latest_version(&self) -> InfraResult<String> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let release: LatestRelease = agent
            .get(&self.url)
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "devspace")
            .call()
            .map_err(|e| InfraError::release(e.to_string()))?
            .into_json()
            .map_err(|e| InfraError::release(format!("decode response: {e}")))?;
        Ok(release.tag_name)
    }
}

/// Analytics sink writing events to the log under the `analytics` target.
#[derive(Debug, Default)]
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn send_command_event(&self, event: &CommandEvent) {
        match &event.error {
            Some(e) => debug!(target: "analytics", command = %event.command, error = %e, "command failed"),
            None => debug!(target: "analytics", command = %event.command, "command succeeded"),
        }
    }

    fn report_panic(&self, message: &str) {
        error!(target: "analytics", panic = %message, "unrecovered panic");
    }
}
