use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::global::utils::{get_global_cache_dir, get_global_config_dir};
use crate::registry::DEFAULT_API_URL;

/// Name of the settings file in the per-user config directory.
pub const SETTINGS_FILE: &str = "config.toml";

/// Optional settings, read from a TOML file.
///
/// ```toml
/// api_url = "https://ghe.example.com/api/v3"
/// cache_dir = "/var/cache/setup-mmock"
/// temp_dir = "/tmp/runner"
/// ```
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Root of the GitHub REST API used for release metadata.
    pub api_url: Option<String>,
    /// Root of the local cache store.
    pub cache_dir: Option<PathBuf>,
    /// Root under which install directories are created.
    pub temp_dir: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or has unknown keys.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Settings::parse(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(content: &str) -> std::result::Result<Settings, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Loads `explicit` if given, else the per-user settings file if it
    /// exists, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Settings> {
        if let Some(path) = explicit {
            return Settings::load(path);
        }
        let default_path = get_global_config_dir()?.join(SETTINGS_FILE);
        if default_path.exists() {
            log::debug!("Using settings from {}", default_path.display());
            Settings::load(default_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// API root: the file, then `GITHUB_API_URL`, then api.github.com.
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .or_else(|| std::env::var("GITHUB_API_URL").ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Cache store root: the file, then the per-user cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_global_cache_dir(),
        }
    }

    /// Temporary-files root: the file, then `RUNNER_TEMP`, then the OS
    /// temp dir.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .or_else(|| {
                std::env::var_os("RUNNER_TEMP")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://ghe.example.com/api/v3\"\ncache_dir = \"/var/cache/mmock\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(settings.cache_dir().unwrap(), PathBuf::from("/var/cache/mmock"));
        assert!(settings.temp_dir.is_none());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cache = \"/nope\"\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = Settings::discover(Some(dir.path().join("missing.toml").as_path())).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_explicit_temp_dir_wins() {
        let settings = Settings {
            temp_dir: Some(PathBuf::from("/scratch")),
            ..Settings::default()
        };
        assert_eq!(settings.temp_root(), PathBuf::from("/scratch"));
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }
}
