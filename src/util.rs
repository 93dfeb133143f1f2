use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Hex-encoded SHA-256 of `key`. Used as a filesystem-safe name for cache
/// entries.
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Recursively copies the contents of `src` into `dst`, creating `dst`.
/// Existing files are overwritten. Symlinks are recreated on unix and
/// followed elsewhere.
///
/// Returns the number of files copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<usize> {
    std::fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;
    let mut files = 0;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            Error::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::Cache(e.to_string()))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            files += 1;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
            files += 1;
        }
    }
    Ok(files)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let destination = std::fs::read_link(link).map_err(|e| Error::io(link, e))?;
    if target.symlink_metadata().is_ok() {
        std::fs::remove_file(target).map_err(|e| Error::io(target, e))?;
    }
    std::os::unix::fs::symlink(destination, target).map_err(|e| Error::io(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    std::fs::copy(link, target).map_err(|e| Error::io(target, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_hash_key_is_stable_hex() {
        let a = hash_key("mmock-cache-3.0.2-linux-x64");
        let b = hash_key("mmock-cache-3.0.2-linux-x64");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, hash_key("mmock-cache-3.0.2-darwin-x64"));
    }

    #[test]
    fn test_copy_dir_all_copies_nested_tree() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("docs")).unwrap();
        std::fs::write(src.join("mmock"), b"bin").unwrap();
        std::fs::write(src.join("docs").join("README.md"), b"readme").unwrap();

        let dst = dir.path().join("dst");
        let copied = copy_dir_all(&src, &dst).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(std::fs::read(dst.join("mmock")).unwrap(), b"bin");
        assert_eq!(std::fs::read(dst.join("docs").join("README.md")).unwrap(), b"readme");
    }

    #[test]
    fn test_copy_dir_all_missing_source_fails() {
        let dir = tempdir().unwrap();
        assert!(copy_dir_all(&dir.path().join("nope"), &dir.path().join("dst")).is_err());
    }
}
