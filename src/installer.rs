use std::io::Write;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveFormat;
use crate::error::{Error, Result};
use crate::global::cache::CacheStore;
use crate::locator::locate;
use crate::platform::Platform;
use crate::registry::Backend;
use crate::version::ConcreteVersion;
use crate::workflow::Workflow;

/// Cache key for an install. Identical (version, OS, arch) always yields
/// the identical key.
pub fn cache_key(version: &ConcreteVersion, platform: &Platform) -> String {
    format!("mmock-cache-{}-{}-{}", version, platform.os, platform.arch)
}

/// Outcome of a cache restore attempt.
#[derive(Debug)]
pub enum CacheLookup {
    Hit,
    /// No entry for the key.
    Miss,
    /// The backend failed; handled like a miss.
    Unavailable(Error),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit)
    }
}

/// Where the installed files came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSource {
    Cache,
    Download,
}

/// A completed install.
#[derive(Debug)]
pub struct Installation {
    pub version: ConcreteVersion,
    /// Directory holding the unpacked artifact, already on the search path.
    pub dir: PathBuf,
    pub source: InstallSource,
    pub lookup: CacheLookup,
    /// Whether the freshly downloaded directory was stored in the cache.
    pub saved: bool,
}

/// Cache-first installer for one platform.
pub struct Installer<'a> {
    backend: &'a dyn Backend,
    cache: &'a dyn CacheStore,
    platform: Platform,
    temp_root: PathBuf,
}

impl<'a> Installer<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        cache: &'a dyn CacheStore,
        platform: Platform,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            cache,
            platform,
            temp_root: temp_root.into(),
        }
    }

    /// `<temp root>/mmock-<version>`.
    pub fn install_dir(&self, version: &ConcreteVersion) -> PathBuf {
        self.temp_root.join(format!("mmock-{version}"))
    }

    /// Restores `key` into `dir`, separating "no entry" from "backend down".
    /// Failures of a non-recoverable kind are returned as errors.
    pub fn restore(&self, key: &str, dir: &Path) -> Result<CacheLookup> {
        match self.cache.restore(key, dir) {
            Ok(true) => Ok(CacheLookup::Hit),
            Ok(false) => Ok(CacheLookup::Miss),
            Err(err) if err.kind().is_recoverable() => Ok(CacheLookup::Unavailable(err)),
            Err(err) => Err(err),
        }
    }

    fn save(&self, key: &str, dir: &Path) -> Result<bool> {
        match self.cache.save(key, dir) {
            Ok(()) => Ok(true),
            Err(err) if err.kind().is_recoverable() => {
                log::warn!("{err}");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Installs `version` and registers the install directory on the
    /// workflow search path.
    ///
    /// On a cache hit nothing is downloaded and the restored directory is
    /// trusted as is. On a miss the artifact is located, downloaded,
    /// extracted and saved back to the cache. Cache failures only warn; any
    /// other failure aborts before the search path is touched.
    pub fn install(&self, version: &ConcreteVersion, workflow: &mut Workflow) -> Result<Installation> {
        let dir = self.install_dir(version);
        let key = cache_key(version, &self.platform);

        log::info!(
            "Version to install: {} (target directory: {})",
            version,
            dir.display()
        );

        let lookup = self.restore(&key, &dir)?;
        let (source, saved) = match &lookup {
            CacheLookup::Hit => {
                log::info!("👌 MMock restored from cache");
                (InstallSource::Cache, false)
            }
            miss => {
                if let CacheLookup::Unavailable(err) = miss {
                    log::warn!("{err}");
                }
                self.download_and_extract(version, &dir)?;
                (InstallSource::Download, self.save(&key, &dir)?)
            }
        };

        workflow.add_path(&dir)?;

        Ok(Installation {
            version: version.clone(),
            dir,
            source,
            lookup,
            saved,
        })
    }

    fn download_and_extract(&self, version: &ConcreteVersion, dir: &Path) -> Result<()> {
        let artifact = locate(&self.platform, version)?;
        let format = ArchiveFormat::from_url(&artifact.url)?;

        log::debug!("Downloading mmock from {}", artifact.url);

        std::fs::create_dir_all(&self.temp_root).map_err(|e| Error::io(&self.temp_root, e))?;
        let mut archive = tempfile::Builder::new()
            .prefix("mmock-dist-")
            .suffix(format.extension())
            .tempfile_in(&self.temp_root)
            .map_err(|e| Error::io(&self.temp_root, e))?;

        let bytes = self.backend.download(&artifact.url, archive.as_file_mut())?;
        archive
            .as_file_mut()
            .flush()
            .map_err(|e| Error::io(archive.path(), e))?;
        log::debug!("Downloaded {} ({} bytes)", artifact.asset, bytes);

        format.extract(archive.path(), dir)?;

        let archive_path = archive.path().to_path_buf();
        archive.close().map_err(|e| Error::io(archive_path, e))
    }
}
