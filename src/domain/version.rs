//! Version freshness comparison
//!
//! Every way the check can fail ends in `VersionCheck::Skipped`; nothing here
//! returns an error to the caller.

use std::fmt;

use semver::Version;

use crate::domain::DomainError;

/// Why no comparison took place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No version embedded at build time (local/dev build)
    DevBuild,
    /// The latest published version could not be determined
    LookupFailed(String),
    /// The running version is not a semantic version
    InvalidCurrent(String),
    /// The published version is not a semantic version
    InvalidLatest(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DevBuild => write!(f, "development build"),
            SkipReason::LookupFailed(e) => write!(f, "latest version lookup failed: {e}"),
            SkipReason::InvalidCurrent(e) => write!(f, "current version unparsable: {e}"),
            SkipReason::InvalidLatest(e) => write!(f, "latest version unparsable: {e}"),
        }
    }
}

/// Outcome of comparing the running build against the latest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Skipped(SkipReason),
    UpToDate,
    NewerAvailable { current: Version, latest: Version },
}

impl VersionCheck {
    /// Compare two raw version strings.
    pub fn compare(current: &str, latest: &str) -> Self {
        let current = match parse_version(current) {
            Ok(v) => v,
            Err(e) => return Self::Skipped(SkipReason::InvalidCurrent(e.to_string())),
        };
        let latest = match parse_version(latest) {
            Ok(v) => v,
            Err(e) => return Self::Skipped(SkipReason::InvalidLatest(e.to_string())),
        };

        if latest > current {
            Self::NewerAvailable { current, latest }
        } else {
            Self::UpToDate
        }
    }

    /// User-facing upgrade hint, only when a newer release exists.
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::NewerAvailable { latest, .. } => Some(format!(
                "There is a newer version of DevSpace: v{latest}. Run `devspace upgrade` to upgrade to the newest version."
            )),
            _ => None,
        }
    }
}

/// Parse a semantic version, tolerating a leading `v` (release tags use `v1.2.3`)
/// and missing minor or patch components (`v4.2` is `4.2.0`).
pub fn parse_version(raw: &str) -> Result<Version, DomainError> {
    let trimmed = raw.trim();
    let candidate = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(&pad_components(candidate)).map_err(|e| DomainError::InvalidVersion {
        input: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Append `.0` until the core `major.minor.patch` has three parts.
fn pad_components(candidate: &str) -> String {
    let split = candidate.find(['-', '+']).unwrap_or(candidate.len());
    let (core, suffix) = candidate.split_at(split);
    if core.is_empty() {
        return candidate.to_string();
    }
    let missing = 3usize.saturating_sub(core.split('.').count());
    format!("{core}{}{suffix}", ".0".repeat(missing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_newer_latest_when_compare_then_warning_names_latest() {
        let check = VersionCheck::compare("1.2.0", "1.3.0");

        let warning = check.warning().expect("warning expected");
        assert!(warning.contains("1.3.0"));
        assert!(warning.contains("devspace upgrade"));
    }

    #[rstest]
    #[case("1.2.0", "1.2.0")]
    #[case("1.2.0", "1.1.0")]
    #[case("v2.0.0", "1.9.9")]
    fn given_latest_not_greater_when_compare_then_up_to_date(
        #[case] current: &str,
        #[case] latest: &str,
    ) {
        let check = VersionCheck::compare(current, latest);
        assert_eq!(check, VersionCheck::UpToDate);
        assert!(check.warning().is_none());
    }

    #[rstest]
    #[case("v4.2", "4.2.0")]
    #[case("4", "4.0.0")]
    #[case("v4.2-beta.1", "4.2.0-beta.1")]
    #[case("1.2.3", "1.2.3")]
    fn given_short_version_when_parsing_then_missing_parts_are_zero(
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(parse_version(raw).unwrap(), Version::parse(expected).unwrap());
    }

    #[test]
    fn given_short_latest_tag_when_compare_then_still_checked() {
        let check = VersionCheck::compare("4.1.0", "v4.2");
        assert!(check.warning().is_some_and(|w| w.contains("4.2")));
    }

    #[test]
    fn given_invalid_current_when_compare_then_skipped() {
        let check = VersionCheck::compare("not-a-version", "1.3.0");
        assert!(matches!(
            check,
            VersionCheck::Skipped(SkipReason::InvalidCurrent(_))
        ));
        assert!(check.warning().is_none());
    }

    #[test]
    fn given_invalid_latest_when_compare_then_skipped() {
        let check = VersionCheck::compare("1.2.0", "not-a-version");
        assert!(matches!(
            check,
            VersionCheck::Skipped(SkipReason::InvalidLatest(_))
        ));
    }

    #[test]
    fn given_prerelease_current_when_stable_released_then_newer() {
        let check = VersionCheck::compare("1.3.0-beta.1", "v1.3.0");
        assert!(check.warning().is_some());
    }

    #[test]
    fn test_parse_version_strips_v_prefix() {
        let v = parse_version(" v3.5.1 ").unwrap();
        assert_eq!(v, Version::new(3, 5, 1));
    }
}
