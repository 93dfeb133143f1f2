use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{copy_dir_all, hash_key};

const MANIFEST_FILE: &str = "entry.json";
const TREE_DIR: &str = "tree";

/// Persistent store for install directories, addressed by cache key.
///
/// Implementations report every backend failure as [`Error::Cache`].
pub trait CacheStore {
    /// Copies the entry for `key` into `dest`.
    ///
    /// `Ok(true)` on a hit, `Ok(false)` when there is no entry for `key`.
    /// `Err` only when the backend itself fails.
    fn restore(&self, key: &str, dest: &Path) -> Result<bool>;

    /// Stores the contents of `src` under `key`.
    fn save(&self, key: &str, src: &Path) -> Result<()>;
}

/// Reports any failure inside a store as a cache backend failure.
fn backend_error(err: Error) -> Error {
    match err {
        Error::Cache(_) => err,
        other => Error::Cache(other.to_string()),
    }
}

/// Manifest written next to every stored tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub files: usize,
    /// Seconds since the unix epoch.
    pub saved_at: u64,
}

/// Cache store on the local filesystem.
///
/// Layout: `<root>/<sha256(key)>/entry.json` and `<root>/<sha256(key)>/tree/`.
#[derive(Debug, Clone)]
pub struct LocalCacheStore {
    root: PathBuf,
}

impl LocalCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, key: &str) -> PathBuf {
        self.root.join(hash_key(key))
    }

    fn read_manifest(dir: &Path) -> Result<Option<CacheEntry>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let entry = serde_json::from_str(&content)
            .map_err(|e| Error::Cache(format!("corrupt manifest {}: {e}", path.display())))?;
        Ok(Some(entry))
    }

    /// Whether an entry for `key` exists.
    pub fn is_cached(&self, key: &str) -> Result<bool> {
        Ok(Self::read_manifest(&self.entry_dir(key))?.is_some_and(|entry| entry.key == key))
    }

    /// All stored entries, sorted by key. Entries with an unreadable
    /// manifest are skipped.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for dir in std::fs::read_dir(&self.root).map_err(|e| Error::io(&self.root, e))? {
            let dir = dir.map_err(|e| Error::io(&self.root, e))?;
            match Self::read_manifest(&dir.path()) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(err) => log::warn!("Skipping cache entry: {err}"),
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        }
        std::fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        Ok(())
    }

    fn restore_entry(&self, key: &str, dest: &Path) -> Result<bool> {
        let dir = self.entry_dir(key);
        let entry = match Self::read_manifest(&dir)? {
            Some(entry) if entry.key == key => entry,
            _ => return Ok(false),
        };
        let tree = dir.join(TREE_DIR);
        if !tree.is_dir() {
            return Err(Error::Cache(format!(
                "entry for {} has no stored tree",
                entry.key
            )));
        }
        copy_dir_all(&tree, dest)?;
        log::debug!("Restored {} files for {}", entry.files, key);
        Ok(true)
    }

    fn save_entry(&self, key: &str, src: &Path) -> Result<()> {
        let dir = self.entry_dir(key);
        if dir.exists() {
            match Self::read_manifest(&dir) {
                Ok(Some(_)) => {
                    return Err(Error::Cache(format!(
                        "unable to reserve cache with key {key}, another entry already exists"
                    )));
                }
                // leftovers of a broken entry are replaced
                Ok(None) | Err(_) => {
                    log::debug!("Replacing broken cache entry for {key}");
                    std::fs::remove_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
                }
            }
        }

        let staging = self.root.join(format!(".{}.tmp", hash_key(key)));
        if staging.exists() {
            std::fs::remove_dir_all(&staging).map_err(|e| Error::io(&staging, e))?;
        }

        let stage = || -> Result<()> {
            let files = copy_dir_all(src, &staging.join(TREE_DIR))?;
            let entry = CacheEntry {
                key: key.to_string(),
                files,
                saved_at: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default(),
            };
            let manifest = serde_json::to_string_pretty(&entry)
                .map_err(|e| Error::Cache(e.to_string()))?;
            let path = staging.join(MANIFEST_FILE);
            std::fs::write(&path, manifest).map_err(|e| Error::io(&path, e))?;
            std::fs::rename(&staging, &dir).map_err(|e| Error::io(&dir, e))
        };

        if let Err(err) = stage() {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(err);
        }
        log::debug!("Saved {} to cache under {}", src.display(), key);
        Ok(())
    }
}

impl CacheStore for LocalCacheStore {
    fn restore(&self, key: &str, dest: &Path) -> Result<bool> {
        self.restore_entry(key, dest).map_err(backend_error)
    }

    fn save(&self, key: &str, src: &Path) -> Result<()> {
        self.save_entry(key, src).map_err(backend_error)
    }
}
