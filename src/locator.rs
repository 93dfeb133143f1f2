//! Maps a version and platform to the MMock release asset URL.
//!
//! Upstream renamed its release assets twice. Each (OS, architecture) pair
//! owns an ascending list of [`NamingRule`]s; the rule with the greatest lower
//! bound not exceeding the requested version wins.
//!
//! | Versions          | linux x64                          | darwin x64                          | darwin arm64               | win32 x64                            |
//! |-------------------|------------------------------------|-------------------------------------|----------------------------|--------------------------------------|
//! | `< 3.0.1`         | `mmock_{v}_linux_64-bit.tar.gz`    | `mmock_{v}_macOS_64-bit.tar.gz`     | none                       | `mmock_{v}_windows_64-bit.tar.gz`    |
//! | `3.0.1 .. 4.0.0`  | `mmock_Linux_x86_64.tar.gz`        | `mmock_macOS_x86_64.tar.gz`         | `mmock_macOS_arm64.tar.gz` | `mmock_Windows_x86_64.zip`           |
//! | `>= 4.0.0`        | `mmock_Linux_x86_64.tar.gz`        | `mmock_Darwin_x86_64.tar.gz`        | `mmock_Darwin_arm64.tar.gz`| `mmock_Windows_x86_64.zip`           |

use semver::Version;

use crate::error::{Error, Result};
use crate::platform::{Arch, Os, Platform};
use crate::version::ConcreteVersion;
use crate::{UPSTREAM_NAME, UPSTREAM_OWNER};

/// Host serving release assets.
pub const DOWNLOAD_BASE: &str = "https://github.com";

/// Placeholder replaced by the concrete version in asset templates.
const VERSION_PLACEHOLDER: &str = "{version}";

/// An asset filename template valid from `since` (inclusive) until the next
/// rule's lower bound (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingRule {
    since: (u64, u64, u64),
    template: &'static str,
}

impl NamingRule {
    const fn new(since: (u64, u64, u64), template: &'static str) -> Self {
        Self { since, template }
    }

    pub fn since(&self) -> Version {
        let (major, minor, patch) = self.since;
        Version::new(major, minor, patch)
    }

    /// Asset filename for `version`.
    pub fn asset_name(&self, version: &ConcreteVersion) -> String {
        self.template.replace(VERSION_PLACEHOLDER, version.as_str())
    }
}

const LINUX_X64: &[NamingRule] = &[
    NamingRule::new((0, 0, 0), "mmock_{version}_linux_64-bit.tar.gz"),
    NamingRule::new((3, 0, 1), "mmock_Linux_x86_64.tar.gz"),
];

const DARWIN_X64: &[NamingRule] = &[
    NamingRule::new((0, 0, 0), "mmock_{version}_macOS_64-bit.tar.gz"),
    NamingRule::new((3, 0, 1), "mmock_macOS_x86_64.tar.gz"),
    NamingRule::new((4, 0, 0), "mmock_Darwin_x86_64.tar.gz"),
];

// No arm64 asset exists below 3.0.1.
const DARWIN_ARM64: &[NamingRule] = &[
    NamingRule::new((3, 0, 1), "mmock_macOS_arm64.tar.gz"),
    NamingRule::new((4, 0, 0), "mmock_Darwin_arm64.tar.gz"),
];

const WINDOWS_X64: &[NamingRule] = &[
    NamingRule::new((0, 0, 0), "mmock_{version}_windows_64-bit.tar.gz"),
    NamingRule::new((3, 0, 1), "mmock_Windows_x86_64.zip"),
];

/// Naming rules for a platform, ascending by lower bound. `None` when the
/// architecture is never published for that OS.
pub fn naming_rules(os: Os, arch: &Arch) -> Option<&'static [NamingRule]> {
    match (os, arch) {
        (Os::Linux, Arch::X64) => Some(LINUX_X64),
        (Os::Darwin, Arch::X64) => Some(DARWIN_X64),
        (Os::Darwin, Arch::Arm64) => Some(DARWIN_ARM64),
        (Os::Windows, Arch::X64) => Some(WINDOWS_X64),
        _ => None,
    }
}

/// Picks the rule with the greatest lower bound `<= version`.
pub fn select_rule<'a>(rules: &'a [NamingRule], version: &Version) -> Option<&'a NamingRule> {
    rules.iter().rev().find(|rule| rule.since() <= *version)
}

/// A located release asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Asset filename, e.g. `mmock_Linux_x86_64.tar.gz`.
    pub asset: String,
    /// Full download URL.
    pub url: String,
}

/// Computes the download URL of the MMock release asset for `platform` at
/// `version`.
///
/// Pure: the same inputs always give the same URL, and combinations with no
/// published asset fail instead of guessing.
///
/// # Errors
///
/// - [`Error::InvalidVersion`] when `version` is not a semantic version.
/// - [`Error::UnsupportedArch`] when the architecture is never published for
///   the OS (any windows arm64, any architecture besides x64/arm64).
/// - [`Error::NoAsset`] when the architecture exists for the OS but not yet
///   at this version (darwin arm64 below 3.0.1).
///
/// # Example
///
/// ```
/// use setup_mmock::{locate, Arch, ConcreteVersion, Os, Platform};
///
/// let platform = Platform::new(Os::Linux, Arch::X64);
/// let artifact = locate(&platform, &ConcreteVersion::new("3.0.1")).unwrap();
/// assert_eq!(
///     artifact.url,
///     "https://github.com/jmartin82/mmock/releases/download/v3.0.1/mmock_Linux_x86_64.tar.gz"
/// );
/// ```
pub fn locate(platform: &Platform, version: &ConcreteVersion) -> Result<Artifact> {
    let parsed = version.semver()?;

    let rules = naming_rules(platform.os, &platform.arch).ok_or_else(|| Error::UnsupportedArch {
        os: platform.os,
        arch: platform.arch.clone(),
    })?;

    let rule = select_rule(rules, &parsed).ok_or_else(|| Error::NoAsset {
        os: platform.os,
        arch: platform.arch.clone(),
        version: version.to_string(),
    })?;

    let asset = rule.asset_name(version);
    let url = format!(
        "{DOWNLOAD_BASE}/{UPSTREAM_OWNER}/{UPSTREAM_NAME}/releases/download/v{version}/{asset}"
    );
    Ok(Artifact { asset, url })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(os: Os, arch: Arch, version: &str) -> Result<String> {
        locate(&Platform::new(os, arch), &ConcreteVersion::new(version)).map(|a| a.asset)
    }

    #[test]
    fn test_linux_boundary_at_3_0_1() {
        assert_eq!(
            asset(Os::Linux, Arch::X64, "3.0.0").unwrap(),
            "mmock_3.0.0_linux_64-bit.tar.gz"
        );
        assert_eq!(
            asset(Os::Linux, Arch::X64, "3.0.1").unwrap(),
            "mmock_Linux_x86_64.tar.gz"
        );
        assert_eq!(
            asset(Os::Linux, Arch::X64, "4.2.0").unwrap(),
            "mmock_Linux_x86_64.tar.gz"
        );
    }

    #[test]
    fn test_darwin_boundaries() {
        assert_eq!(
            asset(Os::Darwin, Arch::X64, "2.7.9").unwrap(),
            "mmock_2.7.9_macOS_64-bit.tar.gz"
        );
        assert_eq!(
            asset(Os::Darwin, Arch::X64, "3.1.6").unwrap(),
            "mmock_macOS_x86_64.tar.gz"
        );
        assert_eq!(
            asset(Os::Darwin, Arch::X64, "4.0.0").unwrap(),
            "mmock_Darwin_x86_64.tar.gz"
        );
        assert_eq!(
            asset(Os::Darwin, Arch::X64, "4.2.0").unwrap(),
            "mmock_Darwin_x86_64.tar.gz"
        );
    }

    #[test]
    fn test_windows_switches_to_zip() {
        assert_eq!(
            asset(Os::Windows, Arch::X64, "2.7.7").unwrap(),
            "mmock_2.7.7_windows_64-bit.tar.gz"
        );
        assert_eq!(
            asset(Os::Windows, Arch::X64, "3.0.3").unwrap(),
            "mmock_Windows_x86_64.zip"
        );
    }

    #[test]
    fn test_darwin_arm64_gating() {
        let err = asset(Os::Darwin, Arch::Arm64, "3.0.0").unwrap_err();
        assert!(matches!(err, Error::NoAsset { .. }));
        assert_eq!(
            asset(Os::Darwin, Arch::Arm64, "3.1.2").unwrap(),
            "mmock_macOS_arm64.tar.gz"
        );
        assert_eq!(
            asset(Os::Darwin, Arch::Arm64, "4.0.1").unwrap(),
            "mmock_Darwin_arm64.tar.gz"
        );
    }

    #[test]
    fn test_exact_3_0_1_switch_on_every_platform() {
        let cases = [
            (Os::Darwin, Arch::X64, "3.0.0", "mmock_3.0.0_macOS_64-bit.tar.gz"),
            (Os::Darwin, Arch::X64, "3.0.1", "mmock_macOS_x86_64.tar.gz"),
            (Os::Windows, Arch::X64, "3.0.0", "mmock_3.0.0_windows_64-bit.tar.gz"),
            (Os::Windows, Arch::X64, "3.0.1", "mmock_Windows_x86_64.zip"),
            (Os::Darwin, Arch::Arm64, "3.0.1", "mmock_macOS_arm64.tar.gz"),
        ];
        for (os, arch, version, expected) in cases {
            assert_eq!(asset(os, arch.clone(), version).unwrap(), expected, "{os}/{arch} {version}");
        }
    }

    #[test]
    fn test_top_of_3_x_keeps_macos_names() {
        assert_eq!(
            asset(Os::Darwin, Arch::X64, "3.99.99").unwrap(),
            "mmock_macOS_x86_64.tar.gz"
        );
        assert_eq!(
            asset(Os::Darwin, Arch::Arm64, "3.99.99").unwrap(),
            "mmock_macOS_arm64.tar.gz"
        );
    }

    #[test]
    fn test_prereleases_sort_below_their_release() {
        assert_eq!(
            asset(Os::Darwin, Arch::X64, "4.0.0-rc.1").unwrap(),
            "mmock_macOS_x86_64.tar.gz"
        );
        assert_eq!(
            asset(Os::Linux, Arch::X64, "3.0.1-rc.1").unwrap(),
            "mmock_3.0.1-rc.1_linux_64-bit.tar.gz"
        );
        let err = asset(Os::Darwin, Arch::Arm64, "3.0.1-rc.1").unwrap_err();
        assert!(matches!(err, Error::NoAsset { .. }));
    }

    #[test]
    fn test_windows_arm64_never_supported() {
        for version in ["2.7.7", "3.0.0", "3.1.6", "4.2.0"] {
            let err = asset(Os::Windows, Arch::Arm64, version).unwrap_err();
            assert!(matches!(err, Error::UnsupportedArch { .. }), "{version}");
        }
    }

    #[test]
    fn test_other_architectures_unsupported() {
        let err = asset(Os::Windows, Arch::Other("arm".into()), "3.0.0").unwrap_err();
        assert!(err.to_string().contains("arm"));
        assert!(asset(Os::Linux, Arch::Arm64, "4.2.0").is_err());
        assert!(asset(Os::Linux, Arch::Other("x32".into()), "4.2.0").is_err());
    }

    #[test]
    fn test_semver_ordering_not_lexicographic() {
        // "3.0.10" sorts below "3.0.2" as a string
        assert_eq!(
            asset(Os::Linux, Arch::X64, "3.0.10").unwrap(),
            "mmock_Linux_x86_64.tar.gz"
        );
        assert_eq!(
            asset(Os::Darwin, Arch::X64, "10.0.0").unwrap(),
            "mmock_Darwin_x86_64.tar.gz"
        );
    }

    #[test]
    fn test_malformed_version_fails() {
        let err = asset(Os::Linux, Arch::X64, "3.0").unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }

    #[test]
    fn test_url_layout_and_determinism() {
        let platform = Platform::new(Os::Darwin, Arch::Arm64);
        let version = ConcreteVersion::new("3.1.5");
        let first = locate(&platform, &version).unwrap();
        let second = locate(&platform, &version).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.url,
            "https://github.com/jmartin82/mmock/releases/download/v3.1.5/mmock_macOS_arm64.tar.gz"
        );
    }

    #[test]
    fn test_rule_tables_ascending() {
        for (os, arch) in [
            (Os::Linux, Arch::X64),
            (Os::Darwin, Arch::X64),
            (Os::Darwin, Arch::Arm64),
            (Os::Windows, Arch::X64),
        ] {
            let rules = naming_rules(os, &arch).unwrap();
            assert!(rules.windows(2).all(|pair| pair[0].since() < pair[1].since()));
        }
    }
}
