use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Token that asks for the most recent published release.
pub const LATEST: &str = "latest";

/// Strips exactly one leading `v` or `V` from a version or tag.
pub fn strip_version_prefix(raw: &str) -> &str {
    raw.strip_prefix(['v', 'V']).unwrap_or(raw)
}

/// A version as requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// The most recent published release.
    Latest,
    /// An explicit version, prefix already stripped.
    Exact(ConcreteVersion),
}

impl VersionSpec {
    /// Normalizes the raw input: the prefix is stripped first, then the rest
    /// is compared case-insensitively with `latest`. Explicit versions keep
    /// their casing and are not validated here.
    pub fn parse(raw: &str) -> Result<VersionSpec> {
        let normalized = strip_version_prefix(raw.trim());
        if normalized.is_empty() {
            return Err(Error::EmptyVersion);
        }
        if normalized.eq_ignore_ascii_case(LATEST) {
            Ok(VersionSpec::Latest)
        } else {
            Ok(VersionSpec::Exact(ConcreteVersion(normalized.to_string())))
        }
    }
}

impl FromStr for VersionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        VersionSpec::parse(s)
    }
}

/// A prefix-free version such as `3.0.2`. Used in cache keys, install
/// directory names and download URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteVersion(String);

impl ConcreteVersion {
    /// Builds a concrete version from a tag or version, stripping the prefix.
    pub fn new(raw: &str) -> ConcreteVersion {
        ConcreteVersion(strip_version_prefix(raw.trim()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the version with semantic-version rules.
    pub fn semver(&self) -> Result<semver::Version> {
        semver::Version::parse(&self.0).map_err(|source| Error::InvalidVersion {
            version: self.0.clone(),
            source,
        })
    }
}

impl fmt::Display for ConcreteVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
