//! Shared test setup and fake collaborators

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::traits::{Analytics, CommandEvent, HomeDirProvider, ReleaseSource};
use crate::infrastructure::{InfraError, InfraResult};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let noisy_modules = ["ureq", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Home directory fixed at construction time.
#[derive(Debug, Clone)]
pub struct FixedHomeDir(Option<PathBuf>);

impl FixedHomeDir {
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self(Some(path.as_ref().to_path_buf()))
    }

    /// Simulates a user without a resolvable home directory.
    pub fn missing() -> Self {
        Self(None)
    }
}

impl HomeDirProvider for FixedHomeDir {
    fn home_dir(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Release source answering with a fixed result and counting queries.
#[derive(Debug)]
pub struct StaticReleaseSource {
    latest: Result<String, String>,
    calls: AtomicUsize,
}

impl StaticReleaseSource {
    pub fn latest(version: &str) -> Self {
        Self {
            latest: Ok(version.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            latest: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReleaseSource for StaticReleaseSource {
    fn latest_version(&self) -> InfraResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.latest.clone().map_err(InfraError::release)
    }
}

/// Analytics sink keeping everything it receives.
#[derive(Debug, Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<CommandEvent>>,
    panics: Mutex<Vec<String>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<CommandEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn panics(&self) -> Vec<String> {
        self.panics.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Analytics for RecordingAnalytics {
    fn send_command_event(&self, event: &CommandEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn report_panic(&self, message: &str) {
        if let Ok(mut panics) = self.panics.lock() {
            panics.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_static_source_when_queried_then_counts_calls() {
        let source = StaticReleaseSource::latest("1.0.0");
        assert_eq!(source.latest_version().unwrap(), "1.0.0");
        assert_eq!(source.calls(), 1);
    }
}
