//! # setup-mmock Core Library
//!
//! This crate resolves, downloads, caches and verifies the
//! [MMock](https://github.com/jmartin82/mmock) binary on CI runners.
//!
//! A run is strictly sequential:
//! 1. [`resolve_version`] turns `latest` or an explicit version into a [`ConcreteVersion`].
//! 2. [`locate`] maps (version, OS, architecture) to the release asset URL, following
//!    the upstream asset naming history.
//! 3. [`Installer::install`] restores the install directory from the cache or downloads,
//!    extracts and caches it, then puts it on the search path.
//! 4. [`Verifier::verify`] checks the binary is callable and prints its version banner.
//!
//! ## Modules Overview
//! - [`version`] – Version input normalization
//! - [`registry`] – Release metadata and asset downloads
//! - [`platform`] – OS and architecture identifiers
//! - [`locator`] – Release asset naming rules
//! - [`archive`] – tar.gz and zip extraction
//! - [`installer`] – Cache-first install
//! - [`verify`] – Post-install check
//! - [`workflow`] – Runner environment (search path, outputs, groups)
//! - [`config`] – Settings file
//! - [`global`] – Cache store and per-user directories

pub mod archive;
pub mod config;
pub mod error;
pub mod global;
pub mod installer;
pub mod locator;
pub mod platform;
pub mod registry;
pub mod util;
pub mod verify;
pub mod version;
pub mod workflow;

/// Owner of the upstream repository.
pub const UPSTREAM_OWNER: &str = "jmartin82";
/// Name of the upstream repository.
pub const UPSTREAM_NAME: &str = "mmock";
/// Executable name.
pub const BINARY_NAME: &str = "mmock";
/// Substring the binary prints in its usage text.
pub const VERSION_BANNER: &str = "mmock v";
/// Output carrying the verified binary path.
pub const OUTPUT_BIN: &str = "mmock-bin";

pub use archive::ArchiveFormat;
pub use config::Settings;
pub use error::{Error, ErrorKind, Result};
pub use global::cache::{CacheEntry, CacheStore, LocalCacheStore};
pub use installer::{CacheLookup, InstallSource, Installation, Installer, cache_key};
pub use locator::{Artifact, NamingRule, locate};
pub use platform::{Arch, Os, Platform};
pub use registry::{Backend, GitHubRegistry, MockBackend, resolve_version};
pub use verify::Verifier;
pub use version::{ConcreteVersion, VersionSpec};
pub use workflow::Workflow;
