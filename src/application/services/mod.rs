//! Application services

pub mod version;

pub use version::VersionNotifier;
