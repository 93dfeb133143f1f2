//! Error types for resolving, installing and verifying MMock.
//!
//! Every failure the library can produce is an [`Error`]. Each variant maps to
//! an [`ErrorKind`], which is what callers use to decide whether a failure is
//! fatal. Cache stores report every backend failure as [`Error::Cache`], and
//! the installer downgrades exactly the recoverable kinds to warnings.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::platform::{Arch, Os};

/// Result type alias for setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested version could not be turned into a concrete one.
    Resolution,
    /// Platform, architecture, version or archive format cannot be mapped.
    Unsupported,
    /// The cache backend failed.
    Cache,
    /// Network or filesystem failure while fetching or unpacking.
    Transfer,
    /// The installed binary is missing or misbehaves.
    Verification,
    /// The settings file is unreadable or invalid.
    Configuration,
}

impl ErrorKind {
    /// Whether the installer continues after a failure of this kind.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Cache)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolution => "resolution failure",
            Self::Unsupported => "unsupported request",
            Self::Cache => "cache backend failure",
            Self::Transfer => "download or extraction failure",
            Self::Verification => "verification failure",
            Self::Configuration => "configuration error",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while setting up MMock.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The version input was empty.
    #[error("version input is required")]
    EmptyVersion,

    /// Release metadata could not be fetched.
    #[error("failed to resolve the latest release of {repo}: {message}")]
    Resolution {
        /// `owner/name` of the queried repository.
        repo: String,
        /// What went wrong.
        message: String,
    },

    /// The repository has no published release.
    #[error("no published releases found for {0}")]
    NoReleases(String),

    /// The operating system is not one MMock publishes for.
    #[error("unsupported platform ({0})")]
    UnsupportedPlatform(String),

    /// The architecture is not published for this operating system.
    #[error("unsupported {os} architecture ({arch})")]
    UnsupportedArch {
        /// Target OS.
        os: Os,
        /// Requested architecture.
        arch: Arch,
    },

    /// The architecture exists for this OS, but not for this version.
    #[error("no {os}/{arch} asset is published for version {version}")]
    NoAsset {
        /// Target OS.
        os: Os,
        /// Target architecture.
        arch: Arch,
        /// Requested version.
        version: String,
    },

    /// The version is not a semantic version.
    #[error("invalid version `{version}`: {source}")]
    InvalidVersion {
        /// The offending version string.
        version: String,
        /// Parser error.
        #[source]
        source: semver::Error,
    },

    /// The artifact URL has a suffix no extractor handles.
    #[error("unsupported distributive format: {0}")]
    UnsupportedFormat(String),

    /// The artifact could not be downloaded.
    #[error("download of {url} failed: {message}")]
    Download {
        /// Artifact URL.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// The artifact could not be unpacked.
    #[error("failed to extract {archive}: {message}")]
    Extract {
        /// Archive on disk.
        archive: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The cache backend failed.
    #[error("cache error: {0}")]
    Cache(String),

    /// The binary is not on the search path.
    #[error("{0} binary file not found in $PATH")]
    BinaryNotFound(String),

    /// The binary ran but did not print the expected banner.
    #[error("The output does not contain the required substring `{banner}`: {output}")]
    BannerMismatch {
        /// Expected substring.
        banner: String,
        /// Combined stdout and stderr.
        output: String,
    },

    /// The version banner could not be turned into a matcher.
    #[error("invalid version banner `{banner}`: {source}")]
    BannerPattern {
        /// Banner the matcher was built from.
        banner: String,
        /// Regex compiler error.
        #[source]
        source: regex::Error,
    },

    /// The settings file is invalid.
    #[error("invalid configuration in {path}: {message}")]
    Config {
        /// Settings file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// IO error during file operations.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// HTTP client error.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyVersion | Error::Resolution { .. } | Error::NoReleases(_) => {
                ErrorKind::Resolution
            }
            Error::UnsupportedPlatform(_)
            | Error::UnsupportedArch { .. }
            | Error::NoAsset { .. }
            | Error::InvalidVersion { .. }
            | Error::UnsupportedFormat(_) => ErrorKind::Unsupported,
            Error::Cache(_) => ErrorKind::Cache,
            Error::Download { .. } | Error::Extract { .. } | Error::Io { .. } | Error::Http(_) => {
                ErrorKind::Transfer
            }
            Error::BinaryNotFound(_)
            | Error::BannerMismatch { .. }
            | Error::BannerPattern { .. } => ErrorKind::Verification,
            Error::Config { .. } => ErrorKind::Configuration,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cache_errors_are_recoverable() {
        assert!(Error::Cache("down".into()).kind().is_recoverable());
        assert!(!Error::NoReleases("jmartin82/mmock".into()).kind().is_recoverable());
        assert!(!Error::UnsupportedFormat("x.rar".into()).kind().is_recoverable());
        assert!(!Error::BinaryNotFound("mmock".into()).kind().is_recoverable());
    }

    #[test]
    fn test_unsupported_arch_message_names_values() {
        let err = Error::UnsupportedArch {
            os: Os::Windows,
            arch: Arch::Arm64,
        };
        let message = err.to_string();
        assert!(message.contains("win32"));
        assert!(message.contains("arm64"));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_banner_mismatch_carries_output() {
        let err = Error::BannerMismatch {
            banner: "mmock v".into(),
            output: "command not understood".into(),
        };
        assert!(err.to_string().contains("command not understood"));
        assert_eq!(err.kind(), ErrorKind::Verification);
    }

    #[test]
    fn test_banner_pattern_is_verification_error() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = Error::BannerPattern {
            banner: "(".into(),
            source,
        };
        assert_eq!(err.kind(), ErrorKind::Verification);
        assert!(err.to_string().contains("invalid version banner `(`"));
    }

    #[test]
    fn test_io_constructor_keeps_path() {
        let err = Error::io("/tmp/mmock-3.0.2", io::Error::new(io::ErrorKind::NotFound, "gone"));
        match err {
            Error::Io { path, .. } => assert_eq!(path, PathBuf::from("/tmp/mmock-3.0.2")),
            _ => panic!("Expected Error::Io"),
        }
    }

    #[test]
    fn test_invalid_version_is_unsupported() {
        let source = semver::Version::parse("3.0").unwrap_err();
        let err = Error::InvalidVersion {
            version: "3.0".into(),
            source,
        };
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(err.to_string().contains("3.0"));
    }
}
