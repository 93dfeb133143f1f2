//! Target platform identifiers.
//!
//! MMock publishes for three operating systems. Architectures are kept open
//! ([`Arch::Other`]) so that an unknown host still produces a readable
//! "unsupported" error from the locator instead of failing at detection.

use std::fmt;

use crate::error::{Error, Result};

/// Operating systems MMock publishes release assets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    /// Identifier used in cache keys and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "win32",
        }
    }

    /// Parses an OS name. Accepts `macos` for darwin and `windows` for win32.
    pub fn parse(name: &str) -> Result<Os> {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "darwin" | "macos" => Ok(Os::Darwin),
            "win32" | "windows" => Ok(Os::Windows),
            _ => Err(Error::UnsupportedPlatform(name.to_string())),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    Arm64,
    /// Anything else, kept verbatim for error messages.
    Other(String),
}

impl Arch {
    pub fn as_str(&self) -> &str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
            Arch::Other(name) => name.as_str(),
        }
    }

    /// Parses an architecture name. `x86_64`/`amd64` and `aarch64` are
    /// accepted as synonyms; every other name becomes [`Arch::Other`].
    pub fn parse(name: &str) -> Arch {
        match name.to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Arch::X64,
            "arm64" | "aarch64" => Arch::Arm64,
            other => Arch::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An (OS, architecture) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Parses a platform from an OS and an architecture name.
    pub fn parse(os: &str, arch: &str) -> Result<Platform> {
        Ok(Platform::new(Os::parse(os)?, Arch::parse(arch)))
    }

    /// Detects the platform this process runs on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] when the host OS is not linux,
    /// macOS or windows.
    pub fn detect() -> Result<Platform> {
        Platform::parse(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
