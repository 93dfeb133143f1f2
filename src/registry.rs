use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::version::{ConcreteVersion, VersionSpec};
use crate::{UPSTREAM_NAME, UPSTREAM_OWNER};

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("setup-mmock/", env!("CARGO_PKG_VERSION"));

/// Source of release metadata and release assets.
///
/// [`GitHubRegistry`] talks to GitHub; [`MockBackend`] serves canned data.
pub trait Backend {
    /// Tag of the most recent published release, as published (prefix kept).
    fn latest_release_tag(&self, token: Option<&str>) -> Result<String>;

    /// Streams the asset at `url` into `dest`, returning the byte count.
    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64>;
}

/// Turns the raw version input into a concrete version.
///
/// `latest` (any casing, optional `v` prefix) is resolved against the
/// upstream release metadata; anything else is returned prefix-stripped and
/// otherwise unchanged. Lookup failures are not retried.
///
/// # Example
///
/// ```
/// use setup_mmock::{resolve_version, MockBackend};
///
/// let backend = MockBackend::new().with_latest("v4.2.0");
/// assert_eq!(resolve_version("latest", &backend, None).unwrap().as_str(), "4.2.0");
/// assert_eq!(resolve_version("V3.0.2", &backend, None).unwrap().as_str(), "3.0.2");
/// ```
pub fn resolve_version(
    raw: &str,
    backend: &dyn Backend,
    token: Option<&str>,
) -> Result<ConcreteVersion> {
    match VersionSpec::parse(raw)? {
        VersionSpec::Exact(version) => Ok(version),
        VersionSpec::Latest => {
            log::debug!("Requesting latest MMock version...");
            let tag = backend.latest_release_tag(token)?;
            let version = ConcreteVersion::new(&tag);
            if version.as_str().is_empty() {
                return Err(Error::NoReleases(upstream_repo()));
            }
            log::debug!("Latest version: {version}");
            Ok(version)
        }
    }
}

fn upstream_repo() -> String {
    format!("{UPSTREAM_OWNER}/{UPSTREAM_NAME}")
}

/// Release metadata and assets from GitHub.
pub struct GitHubRegistry {
    client: Client,
    api_url: String,
}

impl GitHubRegistry {
    /// Creates a registry against the given REST API root.
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, UPSTREAM_OWNER, UPSTREAM_NAME
        )
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
}

impl Backend for GitHubRegistry {
    fn latest_release_tag(&self, token: Option<&str>) -> Result<String> {
        let resolution_error = |message: String| Error::Resolution {
            repo: upstream_repo(),
            message,
        };

        let mut request = self
            .client
            .get(self.latest_release_url())
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| resolution_error(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NoReleases(upstream_repo()));
        }
        if !status.is_success() {
            return Err(resolution_error(format!("HTTP {status}")));
        }

        let release: GitHubRelease = response
            .json()
            .map_err(|e| resolution_error(e.to_string()))?;
        Ok(release.tag_name)
    }

    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64> {
        let download_error = |message: String| Error::Download {
            url: url.to_string(),
            message,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(e.to_string()))?;
        response
            .copy_to(dest)
            .map_err(|e| download_error(e.to_string()))
    }
}

/// In-memory backend for tests and dry runs.
///
/// Serves a fixed latest tag and assets keyed by URL, and records every
/// download URL it was asked for.
#[derive(Debug, Default)]
pub struct MockBackend {
    latest: Option<String>,
    assets: HashMap<String, Vec<u8>>,
    downloads: RefCell<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag reported as the latest release.
    pub fn with_latest(mut self, tag: impl Into<String>) -> Self {
        self.latest = Some(tag.into());
        self
    }

    /// Serves `data` for `url`.
    pub fn with_asset(mut self, url: impl Into<String>, data: Vec<u8>) -> Self {
        self.assets.insert(url.into(), data);
        self
    }

    /// URLs downloaded so far, in order.
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.borrow().len()
    }
}

impl Backend for MockBackend {
    fn latest_release_tag(&self, _token: Option<&str>) -> Result<String> {
        self.latest
            .clone()
            .ok_or_else(|| Error::NoReleases(upstream_repo()))
    }

    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64> {
        self.downloads.borrow_mut().push(url.to_string());
        let data = self.assets.get(url).ok_or_else(|| Error::Download {
            url: url.to_string(),
            message: "HTTP 404 Not Found".to_string(),
        })?;
        dest.write_all(data)?;
        Ok(data.len() as u64)
    }
}
