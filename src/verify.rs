use std::path::PathBuf;
use std::process::Command;

use regex::Regex;

use crate::error::{Error, Result};
use crate::workflow::Workflow;
use crate::{BINARY_NAME, OUTPUT_BIN, VERSION_BANNER};

/// Checks that an installed binary is callable and identifies itself.
#[derive(Debug, Clone)]
pub struct Verifier {
    binary: String,
    banner: String,
    pattern: Regex,
}

impl Verifier {
    /// Verifier for `binary`, expecting `banner` (any casing) in its `-h`
    /// output.
    pub fn new(binary: impl Into<String>, banner: impl Into<String>) -> Result<Self> {
        let banner = banner.into();
        let pattern = Regex::new(&format!("(?i){}", regex::escape(&banner))).map_err(|source| {
            Error::BannerPattern {
                banner: banner.clone(),
                source,
            }
        })?;
        Ok(Self {
            binary: binary.into(),
            banner,
            pattern,
        })
    }

    /// Verifier for the MMock binary.
    pub fn mmock() -> Result<Self> {
        Self::new(BINARY_NAME, VERSION_BANNER)
    }

    /// Whether `output` carries the version banner.
    pub fn matches(&self, output: &str) -> bool {
        self.pattern.is_match(output)
    }

    /// Looks the binary up on the workflow search path, runs it with `-h`
    /// and checks its combined output for the banner. The exit code is
    /// ignored. On success the path is published as the `mmock-bin` output.
    pub fn verify(&self, workflow: &mut Workflow) -> Result<PathBuf> {
        let search_path = workflow.joined_search_path()?;
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        let binary = which::which_in(&self.binary, Some(&search_path), cwd)
            .map_err(|_| Error::BinaryNotFound(self.binary.clone()))?;

        log::debug!("Running {} -h", binary.display());
        let output = Command::new(&binary)
            .arg("-h")
            .env("PATH", &search_path)
            .output()
            .map_err(|e| Error::io(&binary, e))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !self.matches(&text) {
            return Err(Error::BannerMismatch {
                banner: self.banner.clone(),
                output: text,
            });
        }

        let path = binary.display().to_string();
        workflow.set_output(OUTPUT_BIN, &path)?;
        log::info!("MMock installed: {path}");
        Ok(binary)
    }
}
