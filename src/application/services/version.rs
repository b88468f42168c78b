//! Version freshness service
//!
//! Compares the running build against the latest published release. Runs once
//! per invocation and never fails: every problem becomes `VersionCheck::Skipped`.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{SkipReason, VersionCheck};
use crate::infrastructure::traits::ReleaseSource;

/// Version embedded at build time; empty for local/dev builds.
pub fn build_version() -> &'static str {
    option_env!("DEVSPACE_VERSION").unwrap_or("")
}

/// Service checking whether a newer release exists.
pub struct VersionNotifier {
    current: String,
    source: Arc<dyn ReleaseSource>,
}

impl VersionNotifier {
    /// Create a notifier for the given running version.
    pub fn new(current: impl Into<String>, source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            current: current.into(),
            source,
        }
    }

    /// Run the check. The release source is not queried for dev builds.
    pub fn check(&self) -> VersionCheck {
        if self.current.is_empty() {
            debug!("version check: no embedded version, skipping");
            return VersionCheck::Skipped(SkipReason::DevBuild);
        }

        let latest = match self.source.latest_version() {
            Ok(latest) => latest,
            Err(e) => {
                debug!("version check: {}", e);
                return VersionCheck::Skipped(SkipReason::LookupFailed(e.to_string()));
            }
        };

        let check = VersionCheck::compare(&self.current, &latest);
        debug!(
            "version check: current={} latest={} -> {:?}",
            self.current, latest, check
        );
        check
    }
}
