//! Panic reporting runs in its own test binary: the hook is process-global.

use std::panic;
use std::sync::Arc;

use devspace::cli::governor::install_panic_hook;
use devspace::util::testing::RecordingAnalytics;

#[test]
fn given_installed_hook_when_panicking_then_analytics_receives_report() {
    // Arrange
    let analytics = Arc::new(RecordingAnalytics::default());
    install_panic_hook(analytics.clone());

    // Act
    let result = panic::catch_unwind(|| panic!("cluster unreachable"));

    // Assert
    assert!(result.is_err());
    let panics = analytics.panics();
    assert_eq!(panics.len(), 1);
    assert!(panics[0].contains("cluster unreachable"));
    assert!(analytics.events().is_empty());
}
