//! Domain layer: global options and version comparison
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod flags;
pub mod version;

pub use error::DomainError;
pub use flags::{GlobalFlags, SharedFlags};
pub use version::{parse_version, SkipReason, VersionCheck};
