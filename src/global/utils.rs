use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{Error, Result};

pub fn get_global_config_dir() -> Result<PathBuf> {
    let (config_dir, _) = get_global_dirs()?;
    Ok(config_dir)
}

pub fn get_global_cache_dir() -> Result<PathBuf> {
    let (_, cache_dir) = get_global_dirs()?;
    Ok(cache_dir)
}

/// Per-user (config, cache) directories for setup-mmock.
pub fn get_global_dirs() -> Result<(PathBuf, PathBuf)> {
    let proj_dirs = ProjectDirs::from("org", "mmock", "setup-mmock")
        .ok_or_else(|| Error::Cache("could not determine the user home directory".to_string()))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    let cache_dir = proj_dirs.cache_dir().to_path_buf();

    Ok((config_dir, cache_dir))
}
