//! Service container for dependency injection
//!
//! Wires up the collaborators the governor depends on.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::services::version::build_version;
use crate::infrastructure::traits::{
    Analytics, GithubReleaseSource, HomeDirProvider, LogAnalytics, ReleaseSource, SystemHomeDir,
};

/// Container holding all collaborators of one invocation.
pub struct ServiceContainer {
    /// Version embedded at build time (empty for dev builds)
    pub version: String,

    /// Home directory lookup
    pub home: Arc<dyn HomeDirProvider>,

    /// Latest release lookup
    pub releases: Arc<dyn ReleaseSource>,

    /// Analytics sink
    pub analytics: Arc<dyn Analytics>,

    /// Environment used for config overrides (`None` = process environment)
    pub env: Option<HashMap<String, String>>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new() -> Self {
        Self::with_deps(
            build_version(),
            Arc::new(SystemHomeDir),
            Arc::new(GithubReleaseSource::default()),
            Arc::new(LogAnalytics),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        version: impl Into<String>,
        home: Arc<dyn HomeDirProvider>,
        releases: Arc<dyn ReleaseSource>,
        analytics: Arc<dyn Analytics>,
    ) -> Self {
        Self {
            version: version.into(),
            home,
            releases,
            analytics,
            env: None,
        }
    }

    /// Use a fixed environment instead of the process environment.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}
